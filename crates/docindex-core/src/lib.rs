//! # docindex core
//!
//! Shared, I/O-free logic for docindex: the document model, error
//! taxonomy, sliding-window chunking, the vector store trait, top-k
//! ranking, and the embedding trait.
//!
//! This crate contains no tokio, sqlx, filesystem, or network
//! dependencies; the `docindex` app crate supplies those.

pub mod chunk;
pub mod embedding;
pub mod error;
pub mod models;
pub mod search;
pub mod store;

pub use error::{IndexError, Result};
