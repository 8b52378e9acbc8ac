//! Brace-depth-aware line chunker for source code.
//!
//! Lines are appended to a buffer while a running brace depth and an
//! "inside a declaration" flag are tracked. Once the buffer grows past
//! `max_chars` it is flushed at the first line where depth is zero and
//! no declaration is open. If that never happens the buffer is
//! force-flushed before a line that would take it past the hard cap
//! (1.5 × `max_chars`), and the depth/declaration state is reset. No
//! chunk exceeds the hard cap unless it is a single longer line.
//!
//! Depth is a heuristic: braces inside strings or comments count too,
//! and unbalanced input can drive it negative. It is not clamped at
//! zero: a negative depth means the soft flush waits until the counter
//! climbs back to zero, with the hard cap as backstop.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{char_len, ChunkOptions};

/// Lines that open a function, class, const-assignment, interface or type.
static DECLARATION_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(export\s+)?(function|class|const\s+\w+\s*=|interface|type)")
        .expect("declaration pattern is valid")
});

/// Split code into chunks that prefer balanced, non-declaration boundaries.
///
/// A single line longer than the hard cap is still emitted, alone, as
/// its own chunk.
pub fn chunk_code(content: &str, opts: &ChunkOptions) -> Vec<String> {
    let hard_cap = opts.hard_cap();
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;
    let mut depth: i64 = 0;
    let mut in_declaration = false;

    for line in content.split('\n') {
        let line_chars = char_len(line) + 1;
        if current_chars > 0 && current_chars + line_chars > hard_cap {
            chunks.push(current.trim().to_string());
            current.clear();
            current_chars = 0;
            in_declaration = false;
            depth = 0;
        }

        depth += brace_delta(line);

        if DECLARATION_START.is_match(line) {
            in_declaration = true;
        }

        current.push_str(line);
        current.push('\n');
        current_chars += line_chars;

        if current_chars > opts.max_chars {
            if depth == 0 && !in_declaration {
                chunks.push(current.trim().to_string());
                current.clear();
                current_chars = 0;
            } else if current_chars > hard_cap {
                // Only reachable when this one line is longer than the cap.
                chunks.push(current.trim().to_string());
                current.clear();
                current_chars = 0;
                in_declaration = false;
                depth = 0;
            }
        }

        if depth == 0 {
            in_declaration = false;
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        chunks.push(tail.to_string());
    }

    chunks.retain(|c| char_len(c) > opts.min_chars);
    chunks
}

/// `{` count minus `}` count for one line.
fn brace_delta(line: &str) -> i64 {
    line.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(max_chars: usize) -> ChunkOptions {
        ChunkOptions {
            max_chars,
            min_chars: 50,
        }
    }

    #[test]
    fn test_single_function_is_one_chunk() {
        let src = "\nexport function add(a: number, b: number): number {\n  const sum = a + b;\n  return sum;\n}\n\n";
        let chunks = chunk_code(src, &opts(800));
        assert_eq!(chunks, vec![src.trim().to_string()]);
    }

    #[test]
    fn test_short_input_dropped() {
        assert!(chunk_code("const x = 1;", &opts(800)).is_empty());
        assert!(chunk_code("", &opts(800)).is_empty());
        assert!(chunk_code("\n\n   \n", &opts(800)).is_empty());
    }

    #[test]
    fn test_long_line_emitted_alone() {
        let line = "x".repeat(1300);
        let chunks = chunk_code(&line, &opts(800));
        assert_eq!(chunks, vec![line]);
    }

    #[test]
    fn test_long_line_with_open_brace_hits_hard_cap() {
        let line = format!("call({{{}", "y".repeat(1300));
        let src = format!("{line}\nfollow_up_statement_that_is_long_enough_to_be_kept_around();");
        let chunks = chunk_code(&src, &opts(800));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], line);
    }

    #[test]
    fn test_splits_between_top_level_blocks() {
        let block = |name: &str| {
            format!(
                "function {name}() {{\n{}}}\n",
                "  doSomethingUseful(withArguments, andMore);\n".repeat(8)
            )
        };
        let src = [block("alpha"), block("beta"), block("gamma")].join("\n");
        // Each block is ~380 chars: past max (300), under the hard cap (450).
        let chunks = chunk_code(&src, &opts(300));

        assert_eq!(chunks.len(), 3);
        for c in &chunks {
            assert_eq!(brace_delta(c), 0, "chunk split inside a block: {c}");
            assert!(c.starts_with("function "));
        }
    }

    #[test]
    fn test_does_not_split_inside_declaration_below_hard_cap() {
        let body = "  const row = table.lookup(key).unwrap_or_default();\n".repeat(12);
        let src = format!("class Repo {{\n{body}}}\n");
        // ~640 chars: past max (500) but under the 750 hard cap.
        let chunks = chunk_code(&src, &opts(500));
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].ends_with('}'));
    }

    #[test]
    fn test_force_split_past_hard_cap() {
        let line = "  const row = table.lookup(key).unwrap_or_default();\n";
        let src = format!("class Repo {{\n{}}}\n", line.repeat(40));
        let o = opts(500);
        let chunks = chunk_code(&src, &o);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(char_len(c) <= o.hard_cap());
        }
    }

    #[test]
    fn test_negative_depth_tolerated() {
        let line = "let value = compute(input, options, more_options_here);\n";
        let src = format!("}}}}\n{}", line.repeat(40));
        let o = opts(300);
        let chunks = chunk_code(&src, &o);
        assert!(chunks.len() > 1);
        assert!(chunks[0].starts_with("}}"));
        for c in &chunks {
            assert!(char_len(c) <= o.hard_cap());
        }
    }

    #[test]
    fn test_flushes_before_line_that_would_cross_hard_cap() {
        let body = format!("  {}\n", "z".repeat(50)).repeat(22);
        let wide = format!("  {}", "w".repeat(102));
        let src = format!("class Big {{\n{body}{wide}\n}}\n");
        let o = ChunkOptions::default();
        let chunks = chunk_code(&src, &o);
        assert_eq!(chunks.len(), 2);
        for c in &chunks {
            assert!(char_len(c) <= o.hard_cap(), "chunk of {} chars", char_len(c));
        }
        assert!(chunks[1].starts_with(&wide.trim()[..10]));
    }

    #[test]
    fn test_declaration_pattern() {
        assert!(DECLARATION_START.is_match("export function foo() {"));
        assert!(DECLARATION_START.is_match("class Foo {"));
        assert!(DECLARATION_START.is_match("const handler = async () => {"));
        assert!(DECLARATION_START.is_match("export interface Props {"));
        assert!(DECLARATION_START.is_match("type Id = string;"));
        assert!(!DECLARATION_START.is_match("  function nested() {"));
        assert!(!DECLARATION_START.is_match("let x = 1;"));
    }

    #[test]
    fn test_multibyte_content() {
        let src = "// ┌──────────┐ box drawing comment line that is long\n".repeat(30);
        let chunks = chunk_code(&src, &opts(200));
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(char_len(c) <= 300);
        }
    }
}
