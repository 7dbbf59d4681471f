//! HTTP gateway of the ns file service.
//!
//! Every route forwards to one `StorageService` call and maps the resulting
//! status onto an HTTP status with a `{"msg": ...}` body.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod service;
pub mod state;

pub use api::create_router;
pub use state::AppState;
