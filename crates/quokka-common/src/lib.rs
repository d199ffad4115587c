//! Common utilities for the Quokka renderer.
//!
//! This crate provides shared infrastructure used by all renderer components:
//! - **Warning System** - colored terminal output for recoverable layout and
//!   style oddities, deduplicated so a reflow loop cannot flood the terminal

pub mod warning;
