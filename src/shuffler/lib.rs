//! # Shuffler Architecture
//!
//! Shuffler organizes a piece of writing as a tree of **sections** (chapters, scenes) and
//! **cards** (the prose itself), stored as a directory of small files. It is a library that
//! happens to have a CLI client: the same core could back a canvas UI or a web service.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Load → command → save                                    │
//! │  - Normalizes inputs (selectors → entity ids)               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Pure business logic over a live `Project`                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core                                                       │
//! │  - document: the live tree and its invariants               │
//! │  - loader / writer / codec: persistence                     │
//! │  - parser: tagged-text import                               │
//! │  - store: StorageProvider, FsStorage, MemoryStorage         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persistence Model
//!
//! Each entity is one file. A section file lists its children by id (plus their canvas
//! position), so the files only reference each other and the loader has to rebuild the
//! tree. Anything on disk that the root does not reach is kept as a *detached* entity
//! rather than dropped. Saves are full rewrites.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr and never exits the process.
//! Diagnostics go through `tracing`; the binary decides where they end up.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`document`]: The live project and its mutation API
//! - [`model`]: Entities (`Section`, `Card`) and their shared fields
//! - [`categories`]: Project category table
//! - [`codec`]: One entity ↔ one file
//! - [`loader`]: Rebuilds a project from its files
//! - [`writer`]: Writes a project to its files
//! - [`parser`]: Tagged-text import
//! - [`store`]: Storage abstraction and implementations
//! - [`config`]: Per-project configuration
//! - [`init`]: Project discovery for clients
//! - [`error`]: Error types

pub mod api;
pub mod categories;
pub mod codec;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod init;
pub mod loader;
pub mod model;
pub mod parser;
pub mod store;
pub mod writer;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
