//! Farm, pond and feed collection models
//!
//! A farm owns an ordered list of ponds. That order is the column order of
//! every exported sheet, so ponds are only ever appended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{FarmId, FeedCollectionId, PondId};

/// A pond as it appears as a sheet column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PondColumn {
    pub pond_id: PondId,
    pub display_name: String,
}

impl PondColumn {
    pub fn new(pond_id: PondId, display_name: impl Into<String>) -> Self {
        Self {
            pond_id,
            display_name: display_name.into(),
        }
    }

    /// Header text for the pond column
    ///
    /// Strips a leading classifier word (e.g. "บ่อ") and surrounding
    /// whitespace so "บ่อ 3" is written as "3".
    pub fn header_label(&self, prefix: &str) -> String {
        let trimmed = self.display_name.trim();
        let stripped = if prefix.is_empty() {
            trimmed
        } else {
            trimmed.strip_prefix(prefix).unwrap_or(trimmed)
        };
        stripped.trim().to_string()
    }
}

/// A farm with its ponds in column order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Farm {
    pub id: FarmId,
    pub name: String,
    #[serde(default)]
    pub ponds: Vec<PondColumn>,
    pub created_at: DateTime<Utc>,
}

impl Farm {
    pub fn new(id: FarmId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ponds: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Validate the farm
    pub fn validate(&self) -> Result<(), DirectoryValidationError> {
        validate_name(&self.name)?;
        for pond in &self.ponds {
            validate_name(&pond.display_name)?;
        }
        Ok(())
    }
}

/// A named feed collection (feed type or supplier lot) that ledgers are kept for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCollection {
    pub id: FeedCollectionId,
    pub name: String,
}

impl FeedCollection {
    pub fn new(id: FeedCollectionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DirectoryValidationError> {
        validate_name(&self.name)
    }
}

fn validate_name(name: &str) -> Result<(), DirectoryValidationError> {
    if name.trim().is_empty() {
        return Err(DirectoryValidationError::EmptyName);
    }
    if name.chars().count() > 100 {
        return Err(DirectoryValidationError::NameTooLong(name.chars().count()));
    }
    Ok(())
}

/// Validation errors for farms, ponds and collections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for DirectoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Name too long ({} characters, max 100)", len)
            }
        }
    }
}

impl std::error::Error for DirectoryValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_label_strips_prefix() {
        let pond = PondColumn::new(PondId::new(1), "  บ่อ 3 ");
        assert_eq!(pond.header_label("บ่อ"), "3");
    }

    #[test]
    fn test_header_label_without_prefix() {
        let pond = PondColumn::new(PondId::new(1), " North ");
        assert_eq!(pond.header_label("บ่อ"), "North");
        assert_eq!(pond.header_label(""), "North");
    }

    #[test]
    fn test_validation() {
        let mut farm = Farm::new(FarmId::new(1), "Chachoengsao");
        assert!(farm.validate().is_ok());

        farm.ponds.push(PondColumn::new(PondId::new(2), "   "));
        assert_eq!(farm.validate(), Err(DirectoryValidationError::EmptyName));

        let collection = FeedCollection::new(FeedCollectionId::new(1), "x".repeat(101));
        assert_eq!(
            collection.validate(),
            Err(DirectoryValidationError::NameTooLong(101))
        );
    }
}
