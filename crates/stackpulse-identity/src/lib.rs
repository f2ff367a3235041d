//! Author identity resolution.
//!
//! Commits carry free-form author names and emails, so one person often
//! shows up under several spellings. This crate groups them with a fuzzy
//! n-gram comparison and counts the distinct people behind a repository.

pub mod authors;
pub mod ngram;
pub mod resolver;

pub use authors::collect_authors;
pub use resolver::IdentityResolver;
