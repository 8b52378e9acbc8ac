//! Core data models used throughout Source Indexer.
//!
//! These types represent the files, chunks, and stored records that flow
//! through the indexing and query pipeline.

use serde::{Deserialize, Serialize};

use crate::chunk::is_prose_name;

/// A file picked up by the scanner, ready to be chunked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the directory the scan ran in.
    pub relative_path: String,
    /// Canonical on-disk path.
    pub absolute_path: String,
    /// File text, already truncated to the configured budget.
    pub content: String,
}

/// One chunk of a file's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// Position of this chunk within its file, starting at 0.
    pub index: usize,
    /// Number of chunks the file produced. Identical across siblings.
    pub total_in_file: usize,
}

/// Coarse content label stored with every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Code,
    Documentation,
    Configuration,
}

impl ContentType {
    /// Derive the label from a file name or path.
    ///
    /// Prose extensions map to `documentation`, `.json` to
    /// `configuration`, everything else to `code`.
    pub fn from_name(name: &str) -> Self {
        if is_prose_name(name) {
            ContentType::Documentation
        } else if name.ends_with(".json") {
            ContentType::Configuration
        } else {
            ContentType::Code
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Code => "code",
            ContentType::Documentation => "documentation",
            ContentType::Configuration => "configuration",
        }
    }
}

/// Metadata persisted next to each vector.
///
/// Field names are part of the stored record shape and are shared with
/// any other writer of the same collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub file: String,
    #[serde(rename = "fullPath")]
    pub full_path: String,
    pub content: String,
    #[serde(rename = "chunkIndex")]
    pub chunk_index: usize,
    #[serde(rename = "totalChunks")]
    pub total_chunks: usize,
    #[serde(rename = "type")]
    pub content_type: ContentType,
}

impl ChunkPayload {
    /// Build the payload for `chunk` of `file`.
    pub fn new(file: &SourceFile, chunk: &Chunk) -> Self {
        Self {
            file: file.relative_path.clone(),
            full_path: file.absolute_path.clone(),
            content: chunk.text.clone(),
            chunk_index: chunk.index,
            total_chunks: chunk.total_in_file,
            content_type: ContentType::from_name(&file.relative_path),
        }
    }
}

/// A vector plus payload, written once to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

/// A ranked result returned by [`VectorStore::search`](crate::store::VectorStore::search).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub payload: ChunkPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_name() {
        assert_eq!(ContentType::from_name("README.md"), ContentType::Documentation);
        assert_eq!(ContentType::from_name("docs/guide.mdx"), ContentType::Documentation);
        assert_eq!(ContentType::from_name("package.json"), ContentType::Configuration);
        assert_eq!(ContentType::from_name("tsconfig.base.json"), ContentType::Configuration);
        assert_eq!(ContentType::from_name("src/app.tsx"), ContentType::Code);
    }

    #[test]
    fn test_payload_field_names() {
        let file = SourceFile {
            relative_path: "src/a.ts".to_string(),
            absolute_path: "/repo/src/a.ts".to_string(),
            content: String::new(),
        };
        let chunk = Chunk {
            text: "export const a = 1;".to_string(),
            index: 2,
            total_in_file: 5,
        };
        let json = serde_json::to_value(ChunkPayload::new(&file, &chunk)).unwrap();
        assert_eq!(json["file"], "src/a.ts");
        assert_eq!(json["fullPath"], "/repo/src/a.ts");
        assert_eq!(json["content"], "export const a = 1;");
        assert_eq!(json["chunkIndex"], 2);
        assert_eq!(json["totalChunks"], 5);
        assert_eq!(json["type"], "code");
    }
}
