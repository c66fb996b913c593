//! Spindle - HTTP/1.0 file and CGI server
//!
//! Serves a directory tree: directories as HTML listings, executables as
//! CGI programs, and everything else readable as static files.

pub mod config;
pub mod handler;
pub mod http;
pub mod resolve;
pub mod server;
