//! Storage engine of the ns file service.
//!
//! Filesystem operations run against a root directory; callers address files
//! by virtual paths that never leave it. The operations are exposed through
//! the `storage.StorageService` gRPC contract from `common`.

pub mod cli;
pub mod config;
pub mod engine;
pub mod filemanager;
pub mod resolver;
pub mod server;

pub use engine::Engine;
pub use server::{StorageServer, serve, serve_with_listener};
