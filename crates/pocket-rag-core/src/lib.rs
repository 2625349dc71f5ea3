//! # pocket-rag core
//!
//! Runtime-agnostic building blocks for pocket-rag: the error taxonomy,
//! the fixed-window chunker, the embedding and completion provider traits,
//! and the in-memory vector store with linear-scan cosine search.
//!
//! This crate does no filesystem or network I/O. The `pocket-rag` app crate
//! supplies document loading, concrete HTTP providers, configuration, and
//! the CLI.

pub mod chunk;
pub mod completion;
pub mod embedding;
pub mod error;
pub mod store;

pub use error::RagError;
