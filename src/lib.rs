//! # docindex
//!
//! A local document index for LLM agents.
//!
//! docindex loads plain-text and PDF documents, splits them into
//! overlapping character windows, embeds each window, and stores the
//! vectors in SQLite. Queries are embedded with the same provider and
//! answered by cosine similarity. The same operations are exposed as a
//! capability table that an agent loop can call through the CLI or an
//! HTTP server.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌─────────────────────────┐
//! │  Loader  │──▶│ Chunker  │──▶│       IndexStore        │
//! │ text/pdf │   │ L / O    │   │ embed → SQLite (append) │
//! └──────────┘   └──────────┘   └───────────┬─────────────┘
//!                                           │ query(text, k)
//!                      ┌────────────────────┤
//!                      ▼                    ▼
//!                 ┌──────────┐        ┌───────────┐
//!                 │   CLI    │        │ HTTP tool │
//!                 │  (dix)   │        │  server   │
//!                 └──────────┘        └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! dix init                              # create the index
//! dix ingest notes.pdf --type pdf       # load, chunk, embed, store
//! dix query "what changed in Q3?" -k 3  # top-k passages
//! dix serve                             # start the tool server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`loader`] | Text and PDF document loading |
//! | [`embedding`] | OpenAI, Ollama, local, hash, and disabled providers |
//! | [`index`] | The [`IndexStore`](index::IndexStore) handle: upsert and query |
//! | [`sqlite_store`] | SQLite-backed vector storage |
//! | [`ingest`] | File ingestion pipeline |
//! | [`action`] | Typed tool requests |
//! | [`traits`] | Tool trait and capability table |
//! | [`web_tools`] | Web search and weather tools |
//! | [`server`] | HTTP tool server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`logging`] | Diagnostic logging setup |
//!
//! The data model, chunker, error taxonomy, and ranking live in the
//! I/O-free `docindex-core` crate and are re-exported here.

pub mod action;
pub mod config;
pub mod db;
pub mod embedding;
pub mod index;
pub mod ingest;
pub mod loader;
pub mod logging;
pub mod migrate;
pub mod search;
pub mod server;
pub mod sqlite_store;
pub mod stats;
pub mod traits;
pub mod web_tools;

pub use docindex_core::{chunk, models, store, IndexError, Result};
