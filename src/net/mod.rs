// net/mod.rs
//! Networking layer: line framing over byte streams.
//! Everything in here is transport-agnostic.

pub mod line_stream;

pub use line_stream::{LineStream, MAX_LINE_LEN};
