//! # tandem-config
//!
//! Build modes, deployment targets and configuration derivation for the
//! Tandem pipeline.
//!
//! A build starts from a single [`BaseTemplate`] (usually loaded from
//! `tandem.config.json`) and a [`BuildMode`]. For each [`BuildTarget`] the
//! [`derive`] function produces an independently owned [`Configuration`];
//! no structure is shared between the configurations of two targets, so a
//! later mutation of one can never leak into the other.

pub mod config;
pub mod derive;
pub mod error;
pub mod mode;
pub mod patterns;
pub mod template;

pub use config::{Configuration, ExternalizationPolicy, NamingStrategy};
pub use derive::derive;
pub use error::{ConfigError, Result};
pub use mode::{BuildMode, BuildTarget};
pub use patterns::{AssetClass, ClassPatterns};
pub use template::BaseTemplate;
