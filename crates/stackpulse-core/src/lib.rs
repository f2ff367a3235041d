//! Core types, configuration, and error handling for stackpulse.
//!
//! This crate provides the shared foundation used by all other stackpulse crates:
//! - [`StackpulseError`]: unified error type using `thiserror`
//! - [`StackpulseConfig`]: configuration loaded from `.stackpulse.toml`
//! - Shared types: [`DiffFile`], [`DiffHunk`], [`CommitStats`], [`StatType`],
//!   [`Fact`], [`FactCode`], [`Author`], [`Repo`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{ApiConfig, ExtractConfig, IdentityConfig, StackpulseConfig};
pub use error::StackpulseError;
pub use types::{
    Author, CommitStats, DiffFile, DiffHunk, Fact, FactCode, OutputFormat, Repo, StatType,
    TECH_SEPARATOR,
};

/// A convenience `Result` type for stackpulse operations.
pub type Result<T> = std::result::Result<T, StackpulseError>;
