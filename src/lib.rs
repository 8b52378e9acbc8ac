//! # Source Indexer
//!
//! Walks a source tree, splits every file into retrieval-sized chunks,
//! embeds each chunk and stores it in a Qdrant collection so the codebase
//! can be searched semantically.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────┐   ┌──────────┐
//! │   Scanner   │──▶│   Chunkers   │──▶│ Embedder │──▶│  Qdrant  │
//! │ roots+files │   │ code/prose/  │   │ local/   │   │ REST API │
//! └─────────────┘   │ package.json │   │ remote   │   └────┬─────┘
//!                   └──────────────┘   └──────────┘        │
//!                                                          ▼
//!                                                   ┌────────────┐
//!                                                   │ srcidx     │
//!                                                   │ query      │
//!                                                   └────────────┘
//! ```
//!
//! Chunking, models and the store/embedder traits live in
//! `source_indexer_core`; this crate wires them to the filesystem and
//! network.
//!
//! ## Quick Start
//!
//! ```bash
//! srcidx init                         # create the collection
//! srcidx index                        # index the default roots
//! srcidx index --root src --dry-run   # count files and chunks only
//! srcidx query "where is the layout defined?"
//! srcidx chunk src/app.tsx            # show how one file is split
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | tracing subscriber setup |
//! | [`scanner`] | Source file discovery |
//! | [`embedding`] | Embedding providers |
//! | [`qdrant`] | Qdrant REST vector store |
//! | [`ingest`] | Indexing orchestration |
//! | [`query`] | Semantic query helper |

pub mod config;
pub mod embedding;
pub mod ingest;
pub mod logging;
pub mod qdrant;
pub mod query;
pub mod scanner;
