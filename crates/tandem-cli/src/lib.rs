//! # tandem-cli
//!
//! Command-line surface for the Tandem build pipeline: one-shot builds
//! and the development watch loop.

pub mod cli;
pub mod commands;
pub mod dev;
pub mod error;
pub mod logger;
