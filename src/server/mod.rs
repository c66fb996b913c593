//! Connection acceptance and scheduling.

pub mod listener;
