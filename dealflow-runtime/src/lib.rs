//! dealflow Runtime
//!
//! Wires the news layer, the language-model agents, the article store and
//! the analysis engine into the three steps the binary exposes:
//! ingest, analyze and report.

pub mod pipeline;

pub use pipeline::*;
