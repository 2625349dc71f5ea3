//! # Pocket RAG
//!
//! A minimal in-memory retrieval-augmented generation pipeline.
//!
//! Documents are split into fixed-size character windows, each window is
//! embedded, and the vectors are kept in an append-only in-memory store.
//! Questions are embedded the same way, the nearest chunks by cosine
//! similarity become the grounding context, and a completion model answers
//! from that context alone.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌──────────────┐
//! │ Document │──▶│  Ingestor   │──▶│ InMemoryStore│
//! │ PDF/text │   │ Chunk+Embed │   │  (RwLock)    │
//! └──────────┘   └─────────────┘   └──────┬───────┘
//!                                         │ top-k cosine
//!                                         ▼
//!                 ┌──────────┐      ┌──────────┐
//!   question ────▶│ Answerer │─────▶│Completion│──▶ answer
//!                 └──────────┘      └──────────┘
//! ```
//!
//! Nothing is persisted: the index lives as long as the process.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`extract`] | Document loading (PDF, UTF-8 text) |
//! | [`chunk`] | Fixed-window text chunking |
//! | [`embedding`] | Embedding providers |
//! | [`completion`] | Completion providers |
//! | [`store`] | Vector store trait and in-memory backend |
//! | [`ingest`] | Ingestion pipeline |
//! | [`answer`] | Retrieval and answering pipeline |
//! | [`commands`] | `prag` CLI commands |

pub mod answer;
pub mod commands;
pub mod completion;
pub mod config;
pub mod embedding;
pub mod extract;
pub mod ingest;

pub use pocket_rag_core::{chunk, store, RagError};
