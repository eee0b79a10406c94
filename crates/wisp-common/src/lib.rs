//! Common utilities for the wisp parsers.
//!
//! This crate provides shared infrastructure used by all parser components:
//! - **Warning System** - colored, deduplicated terminal output for recoverable input oddities

pub mod warning;
