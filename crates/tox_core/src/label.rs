//! Edibility label

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CatalogError;

/// Predicted class of a specimen
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edibility {
    Edible,
    Poisonous,
}

impl Edibility {
    /// Target column code used by the reference dataset
    pub fn code(self) -> char {
        match self {
            Edibility::Edible => 'e',
            Edibility::Poisonous => 'p',
        }
    }

    pub fn from_code(code: char) -> Result<Self, CatalogError> {
        match code {
            'e' => Ok(Edibility::Edible),
            'p' => Ok(Edibility::Poisonous),
            other => Err(CatalogError::UnknownLabel(other.to_string())),
        }
    }

    /// Banner text shown for a finished analysis
    pub fn headline(self) -> &'static str {
        match self {
            Edibility::Edible => "EDIBLE",
            Edibility::Poisonous => "TOXIC",
        }
    }

    pub fn is_edible(self) -> bool {
        self == Edibility::Edible
    }
}

impl fmt::Display for Edibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edibility::Edible => f.write_str("edible"),
            Edibility::Poisonous => f.write_str("poisonous"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(Edibility::from_code('e'), Ok(Edibility::Edible));
        assert_eq!(Edibility::from_code('p'), Ok(Edibility::Poisonous));
        assert_eq!(Edibility::Poisonous.code(), 'p');
        assert!(Edibility::from_code('x').is_err());
    }

    #[test]
    fn test_headline() {
        assert_eq!(Edibility::Edible.headline(), "EDIBLE");
        assert_eq!(Edibility::Poisonous.headline(), "TOXIC");
        assert!(!Edibility::Poisonous.is_edible());
    }
}
