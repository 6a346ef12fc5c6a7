//! Forge API - typed client for a repository-hosting REST API.
//!
//! Provides the authenticated session and the handful of endpoints the
//! forgeflow scenario drives: user profile, repositories, refs, branches,
//! file contents, pull requests and commits.
//!
//! # Example
//!
//! ```
//! use forge_api::{Credentials, ForgeApi, Session};
//!
//! let session = Session::new(Credentials::new("alice", "token")).unwrap();
//! let api = ForgeApi::new(session, forge_api::DEFAULT_API_URL);
//! assert_eq!(api.user(), "alice");
//! ```
//!
//! # Architecture
//!
//! - [`http`]: authenticated session with default headers
//! - [`api`]: one method per endpoint, each enforcing its status code
//! - [`models`]: request and response payloads
//! - [`retry`]: bounded polling for eventually consistent resources
//! - [`error`]: error types and Result alias

pub mod api;
pub mod error;
pub mod http;
pub mod models;
pub mod retry;

pub use api::{ForgeApi, DEFAULT_API_URL};
pub use error::{ForgeError, Result};
pub use http::{AuthScheme, Credentials, Session, SessionBuilder};
pub use retry::{poll_until, Backoff, RetryPolicy};
