//! Content classification and chunking.
//!
//! Turns a file's content into an ordered list of bounded-size text
//! chunks. The file name selects one of three strategies:
//!
//! | Strategy | Selected for | Module |
//! |----------|--------------|--------|
//! | Manifest | `package.json` | [`manifest`] |
//! | Prose | `.md`, `.markdown`, `.mdx` | [`prose`] |
//! | Code | everything else | [`code`] |
//!
//! All lengths are measured in chars, not bytes.
//!
//! # Example
//!
//! ```rust
//! use source_indexer_core::chunk::{chunk_content, ChunkOptions};
//!
//! let body = "export function greet(name: string): string {\n  return `Hello, ${name}! Welcome back.`;\n}\n";
//! let chunks = chunk_content("src/greet.ts", body, &ChunkOptions::default());
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0], body.trim());
//! ```

pub mod code;
pub mod manifest;
pub mod prose;

use std::path::Path;

use crate::models::{Chunk, SourceFile};

/// File names handled by the manifest chunker.
pub const MANIFEST_FILE_NAMES: &[&str] = &["package.json"];

/// Extensions handled by the prose chunker.
pub const PROSE_EXTENSIONS: &[&str] = &["md", "markdown", "mdx"];

/// Default maximum chunk length in chars.
pub const DEFAULT_MAX_CHARS: usize = 800;

/// Default minimum chunk length. Chunks this short or shorter are dropped.
pub const DEFAULT_MIN_CHARS: usize = 50;

/// Size bounds shared by the code and prose chunkers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkOptions {
    /// Soft target: chunkers try to close a chunk once it grows past this.
    pub max_chars: usize,
    /// Chunks whose trimmed length is `<= min_chars` are discarded.
    pub min_chars: usize,
}

impl ChunkOptions {
    /// Hard cap: 1.5 × `max_chars`.
    pub fn hard_cap(&self) -> usize {
        self.max_chars + self.max_chars / 2
    }
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            min_chars: DEFAULT_MIN_CHARS,
        }
    }
}

/// Chunking strategy chosen for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStrategy {
    Manifest,
    Prose,
    Code,
}

/// Pick the chunking strategy for a file name or path.
pub fn classify(name: &str) -> ChunkStrategy {
    let file_name = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name);

    if MANIFEST_FILE_NAMES.contains(&file_name) {
        ChunkStrategy::Manifest
    } else if is_prose_name(name) {
        ChunkStrategy::Prose
    } else {
        ChunkStrategy::Code
    }
}

/// True when `name` carries one of the [`PROSE_EXTENSIONS`].
pub fn is_prose_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| PROSE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Split `content` into chunks using the strategy selected by `name`.
///
/// Pure function of its inputs. Every returned chunk is non-empty after
/// trimming; blank input yields no chunks.
pub fn chunk_content(name: &str, content: &str, opts: &ChunkOptions) -> Vec<String> {
    match classify(name) {
        ChunkStrategy::Manifest => manifest::chunk_manifest(content),
        ChunkStrategy::Prose => prose::chunk_prose(content, opts),
        ChunkStrategy::Code => code::chunk_code(content, opts),
    }
}

/// Chunk a scanned file, attaching contiguous indices and the file total.
pub fn chunk_source_file(file: &SourceFile, opts: &ChunkOptions) -> Vec<Chunk> {
    let texts = chunk_content(&file.relative_path, &file.content, opts);
    let total = texts.len();
    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk {
            text,
            index,
            total_in_file: total,
        })
        .collect()
}

/// Length of `s` in chars.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the `n`-th char of `s`, or `s.len()` when `s` is shorter.
pub(crate) fn byte_offset_of_char(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_manifest() {
        assert_eq!(classify("package.json"), ChunkStrategy::Manifest);
        assert_eq!(classify("apps/web/package.json"), ChunkStrategy::Manifest);
        assert_eq!(classify("my-package.json"), ChunkStrategy::Code);
    }

    #[test]
    fn test_classify_prose() {
        assert_eq!(classify("README.md"), ChunkStrategy::Prose);
        assert_eq!(classify("docs/intro.MD"), ChunkStrategy::Prose);
        assert_eq!(classify("notes.markdown"), ChunkStrategy::Prose);
    }

    #[test]
    fn test_classify_code_fallback() {
        assert_eq!(classify("src/main.ts"), ChunkStrategy::Code);
        assert_eq!(classify("tsconfig.base.json"), ChunkStrategy::Code);
        assert_eq!(classify("Makefile"), ChunkStrategy::Code);
    }

    #[test]
    fn test_hard_cap() {
        assert_eq!(ChunkOptions::default().hard_cap(), 1200);
        let opts = ChunkOptions {
            max_chars: 101,
            min_chars: 0,
        };
        assert_eq!(opts.hard_cap(), 151);
    }

    #[test]
    fn test_chunk_source_file_indices_contiguous() {
        let body = (0..40)
            .map(|i| format!("let value_{i} = compute_something_interesting({i});"))
            .collect::<Vec<_>>()
            .join("\n");
        let file = SourceFile {
            relative_path: "src/values.ts".to_string(),
            absolute_path: "src/values.ts".to_string(),
            content: body,
        };
        let opts = ChunkOptions {
            max_chars: 300,
            min_chars: 50,
        };
        let chunks = chunk_source_file(&file, &opts);
        assert!(chunks.len() > 1);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i);
            assert_eq!(c.total_in_file, chunks.len());
        }
    }

    #[test]
    fn test_bounds_hold_for_code_and_prose() {
        let opts = ChunkOptions::default();
        let code = (0..200)
            .map(|i| format!("    total += item_{i}.weight * factor;"))
            .collect::<Vec<_>>()
            .join("\n");
        let prose = (0..30)
            .map(|i| format!("## Section {i}\n\n{}", "Some prose about the system. ".repeat(i + 1)))
            .collect::<Vec<_>>()
            .join("\n\n");

        for (name, body) in [("src/loop.ts", code), ("GUIDE.md", prose)] {
            for chunk in chunk_content(name, &body, &opts) {
                let len = char_len(&chunk);
                assert!(len > opts.min_chars, "{name}: chunk too short ({len})");
                assert!(len <= opts.hard_cap(), "{name}: chunk too long ({len})");
            }
        }
    }

    #[test]
    fn test_blank_content_yields_no_chunks() {
        let opts = ChunkOptions::default();
        for name in ["package.json", "README.md", "src/index.ts"] {
            let chunks = chunk_content(name, "   \n", &opts);
            assert!(chunks.iter().all(|c| !c.trim().is_empty()), "{name}");
            assert!(chunks.is_empty(), "{name}");
        }
    }

    #[test]
    fn test_byte_offset_of_char_multibyte() {
        let s = "héllo";
        assert_eq!(byte_offset_of_char(s, 2), 3);
        assert_eq!(byte_offset_of_char(s, 10), s.len());
    }
}
