//! Value Objects - Immutable identifiers with validation

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Form identifier (Value Object)
///
/// # Invariants
/// - Strictly positive
/// - Assigned sequentially from 1 in registry order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FormId(u32);

impl FormId {
    /// Create new form ID with validation
    pub fn new(id: u32) -> Result<Self, DomainError> {
        if id == 0 {
            return Err(DomainError::InvalidFormId("must be positive".into()));
        }
        Ok(Self(id))
    }

    /// Id for the form at zero-based registry position `index`
    pub fn from_position(index: usize) -> Self {
        Self(index as u32 + 1)
    }

    /// Get inner value
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for FormId {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FormId> for u32 {
    fn from(id: FormId) -> Self {
        id.0
    }
}

impl FromStr for FormId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u32>()
            .map_err(|_| DomainError::InvalidFormId(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a comma separated allow-list such as `"1,3,4"`.
///
/// Entries that are not positive integers are ignored, matching how the
/// shortcode attribute has always been read.
pub fn parse_form_id_list(raw: &str) -> Vec<FormId> {
    raw.split(',')
        .filter_map(|part| part.parse::<FormId>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_id_valid() {
        let id = FormId::new(3).unwrap();
        assert_eq!(id.get(), 3);
        assert_eq!(id.to_string(), "3");
    }

    #[test]
    fn test_form_id_zero_fails() {
        assert!(FormId::new(0).is_err());
        assert!("0".parse::<FormId>().is_err());
    }

    #[test]
    fn test_form_id_from_position() {
        assert_eq!(FormId::from_position(0).get(), 1);
        assert_eq!(FormId::from_position(4).get(), 5);
    }

    #[test]
    fn test_parse_form_id_list() {
        let ids = parse_form_id_list("1, 3,abc,,4");
        let expected: Vec<FormId> = [1, 3, 4].map(|n| FormId::new(n).unwrap()).to_vec();
        assert_eq!(ids, expected);
        assert!(parse_form_id_list("").is_empty());
    }
}
