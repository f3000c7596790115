//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{RecordingBackend, TestClient, TestServer};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_health() {
//!     let server = TestServer::spawn(RecordingBackend::new()).await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.health().await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod backend;
mod client;
mod constants;
mod fake_datadog;
mod server;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use backend::RecordingBackend;
#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fake_datadog::{FakeDatadog, FakeResponse};
#[allow(unused_imports)]
pub use server::{test_dispatcher, TestServer};
