//! Strongly-typed ID wrappers for all entity types
//!
//! Identifiers are plain integers as assigned by the record store. Using
//! newtype wrappers prevents mixing up a pond id with a farm id at compile
//! time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw store identifier
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the raw store identifier
            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_id!(FarmId, "farm-");
define_id!(PondId, "pond-");
define_id!(FeedCollectionId, "feed-");
define_id!(LedgerEntryId, "entry-");

impl LedgerEntryId {
    /// Sentinel marking an entry that has not been persisted yet
    pub const UNSAVED: LedgerEntryId = LedgerEntryId(-1);

    /// Check whether this is the "unsaved" sentinel
    pub const fn is_unsaved(&self) -> bool {
        self.0 == Self::UNSAVED.0
    }
}
