//! HTTP protocol implementation.
//!
//! This module implements a one-request-per-connection HTTP/1.0 server.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: The per-connection worker implementing the request state machine
//! - **`parser`**: Reads the request line and headers off the client stream
//! - **`request`**: HTTP request representation
//! - **`response`**: Status codes and fully buffered responses
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ── parse error ──┐
//!        └──────┬──────┘                  │
//!               │ Request parsed          │
//!               ▼                         │
//!        ┌─────────────┐                  │
//!        │  Resolving  │ ── not found ────┤
//!        └──────┬──────┘                  │
//!               │ Path inside root        ▼
//!               ▼                  ┌─────────────┐
//!        ┌─────────────┐           │   Failed    │
//!        │ Dispatching │           └──────┬──────┘
//!        └──────┬──────┘                  │ Error page
//!               │ Browse/File/CGI/Error   │
//!               ▼                         │
//!        ┌─────────────┐                  │
//!        │  Responded  │ ◄────────────────┘
//!        └──────┬──────┘
//!               ▼
//!             Closed
//! ```

pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
