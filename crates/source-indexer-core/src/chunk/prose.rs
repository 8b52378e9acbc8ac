//! Heading-delimited chunker for Markdown-like documents.
//!
//! # Algorithm
//!
//! 1. Split the document at every line starting with 1–6 `#` followed by
//!    whitespace. The marker is consumed; the heading text stays at the
//!    top of its section. Text before the first heading is a section too.
//! 2. Drop sections whose trimmed length is `<= min_chars` (a bare
//!    heading with no body).
//! 3. Emit sections that fit in `max_chars` as-is.
//! 4. Split larger sections on `\n\n` paragraph boundaries, accumulating
//!    paragraphs until the next one would overflow `max_chars`, then
//!    flushing and restarting with the overflowing paragraph.
//! 5. A paragraph longer than the hard cap is first hard-split at the
//!    last newline or space before the cap.
//! 6. Trim all output and drop anything `<= min_chars`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{byte_offset_of_char, char_len, ChunkOptions};

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+").expect("heading pattern is valid"));

/// Split a prose document into per-section chunks.
pub fn chunk_prose(content: &str, opts: &ChunkOptions) -> Vec<String> {
    let mut chunks = Vec::new();

    for section in HEADING.split(content) {
        let section = section.trim();
        let section_len = char_len(section);
        if section_len <= opts.min_chars {
            continue;
        }

        if section_len <= opts.max_chars {
            chunks.push(section.to_string());
        } else {
            split_section(section, opts, &mut chunks);
        }
    }

    chunks.retain(|c| char_len(c) > opts.min_chars);
    chunks
}

fn split_section(section: &str, opts: &ChunkOptions, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_chars = 0usize;

    let paragraphs = section
        .split("\n\n")
        .flat_map(|para| hard_split(para, opts.hard_cap()));

    for para in paragraphs {
        let para_chars = char_len(para);
        if current_chars + para_chars > opts.max_chars {
            if !current.is_empty() {
                out.push(current.trim().to_string());
            }
            current = para.to_string();
            current_chars = para_chars;
        } else {
            if !current.is_empty() {
                current.push_str("\n\n");
                current_chars += 2;
            }
            current.push_str(para);
            current_chars += para_chars;
        }
    }

    if !current.is_empty() {
        out.push(current.trim().to_string());
    }
}

/// Break `text` into pieces of at most `cap` chars, preferring to cut
/// right after a newline or space. Text within the cap is returned whole.
fn hard_split(text: &str, cap: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut remaining = text;

    while char_len(remaining) > cap {
        let limit = byte_offset_of_char(remaining, cap);
        let window = &remaining[..limit];
        let cut = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .map(|pos| pos + 1)
            .filter(|&pos| pos > 0 && pos < limit)
            .unwrap_or(limit);
        pieces.push(&remaining[..cut]);
        remaining = &remaining[cut..];
    }
    pieces.push(remaining);
    pieces
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
    fn test_short_document_without_headings_is_dropped() {
        assert!(chunk_prose("Just a short note.", &opts(800)).is_empty());
        assert!(chunk_prose("", &opts(800)).is_empty());
    }

    #[test]
    fn test_document_without_headings_is_one_chunk() {
        let doc = "This document has no headings at all, but it is long enough to keep.";
        assert_eq!(chunk_prose(doc, &opts(800)), vec![doc.to_string()]);
    }

    #[test]
    fn test_one_chunk_per_section() {
        let doc = "# Install\n\nRun the installer and follow the prompts until it finishes.\n\n\
                   ## Usage\n\nInvoke the binary with a path to the directory you want indexed.\n";
        let chunks = chunk_prose(doc, &opts(800));
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with("Install\n\nRun the installer"));
        assert!(chunks[1].starts_with("Usage\n\nInvoke the binary"));
    }

    #[test]
    fn test_heading_only_sections_dropped() {
        let doc = "# Title\n\n## Empty\n\n### Real\n\nThis section actually has a body that is worth embedding.";
        let chunks = chunk_prose(doc, &opts(800));
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].starts_with("Real"));
    }

    #[test]
    fn test_hash_without_space_is_not_a_heading() {
        let doc = "#hashtag lines are not headings, so this stays a single section of text.\n\n#another one";
        let chunks = chunk_prose(doc, &opts(800));
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].contains("#another one"));
    }

    #[test]
    fn test_large_section_split_on_paragraphs() {
        let para = "Paragraph text that carries meaning across a few dozen words.";
        let body = vec![para; 10].join("\n\n");
        let doc = format!("# Big\n\n{body}");
        let o = opts(200);
        let chunks = chunk_prose(&doc, &o);

        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(char_len(c) <= o.max_chars + 2);
            assert!(!c.starts_with("\n"));
        }
        let rejoined: String = chunks.join("\n\n");
        assert_eq!(rejoined.matches(para).count(), 10);
    }

    #[test]
    fn test_oversized_paragraph_hard_split() {
        let para = "word ".repeat(400);
        let doc = format!("# Wall of text\n\n{para}");
        let o = opts(200);
        let chunks = chunk_prose(&doc, &o);

        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(char_len(c) <= o.hard_cap(), "chunk of {} chars", char_len(c));
        }
    }

    #[test]
    fn test_hard_split_prefers_whitespace() {
        let pieces = hard_split("aaaa bbbb cccc", 7);
        assert_eq!(pieces, vec!["aaaa ", "bbbb ", "cccc"]);
        let pieces = hard_split("abcdefghij", 4);
        assert_eq!(pieces, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_hard_split_multibyte() {
        let text = "é".repeat(10);
        let pieces = hard_split(&text, 4);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces.concat(), text);
    }
}
