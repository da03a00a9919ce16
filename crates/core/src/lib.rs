//! `backoffice-core` — domain foundation building blocks.
//!
//! Identifiers and the domain error model shared by the auth and API crates.
//! No infrastructure concerns.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{AccountId, SubjectId};
