//! # murimi-core
//!
//! Core types, traits, and abstractions for the murimi member registry.
//!
//! This crate provides the domain entities (members, cluster leaders, events,
//! soil samples), the shared error type, repository trait definitions, and the
//! pure utilities (permissive numeric parsing, CSV export serialization) that
//! other murimi crates depend on.

pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod numeric;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use export::{
    members_to_csv, ExportFormat, MemberField, ALL_MEMBER_FIELDS,
};
pub use models::*;
pub use numeric::{parse_decimal_or_zero, percent_share, round1};
pub use traits::*;
