//! # Source Indexer Core
//!
//! Shared, I/O-free logic for Source Indexer: data models, content
//! classification, the code/prose/manifest chunkers, point-identifier
//! schemes, and the embedder and vector-store traits.
//!
//! This crate performs no filesystem or network access. The `srcidx`
//! application crate supplies the concrete embedding providers, the
//! Qdrant client, and the directory scanner.

pub mod chunk;
pub mod embedding;
pub mod ids;
pub mod models;
pub mod store;
