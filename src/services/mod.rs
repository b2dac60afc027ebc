//! Service layer module
//!
//! Contains the request client, response classification, and the
//! credential provider seam

pub mod classify;
pub mod client;
pub mod inflight;
pub mod token;

pub use classify::{Disposition, ResponseClassifier};
pub use client::ApiClient;
pub use inflight::InflightRegistry;
pub use token::{MemoryTokenProvider, TokenPair, TokenProvider};
