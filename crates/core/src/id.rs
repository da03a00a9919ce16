//! Strongly-typed identifiers used across the backend.
//!
//! Identities are numeric. Tokens minted by other services sometimes carry the
//! identifier as a JSON string (`"42"`) rather than a number, so both forms are
//! accepted when deserializing.

use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DomainError;

/// Identifier of a locally owned account (admin tiers).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AccountId(u64);

/// Identifier of an authenticated subject, local or remote.
///
/// For local roles this is the same number as the [`AccountId`]; for remote
/// roles it is opaque and only meaningful to the owning service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SubjectId(u64);

#[derive(Deserialize)]
#[serde(untagged)]
enum NumericOrString {
    Numeric(u64),
    Text(String),
}

macro_rules! impl_numeric_id {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $t {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for u64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }

        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                match NumericOrString::deserialize(deserializer)? {
                    NumericOrString::Numeric(value) => Ok(Self(value)),
                    NumericOrString::Text(text) => text.parse().map_err(serde::de::Error::custom),
                }
            }
        }
    };
}

impl_numeric_id!(AccountId, "AccountId");
impl_numeric_id!(SubjectId, "SubjectId");

impl From<AccountId> for SubjectId {
    fn from(value: AccountId) -> Self {
        Self(value.0)
    }
}

impl From<SubjectId> for AccountId {
    fn from(value: SubjectId) -> Self {
        Self(value.0)
    }
}
