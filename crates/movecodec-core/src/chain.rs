//! Move chain families.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Move-based chain family.
/// Determines which ABI translator and value envelope rules apply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Aptos,
    Sui,
    /// Other Move chains plugged in through a custom adapter.
    Custom(String),
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainFamily::Aptos => write!(f, "aptos"),
            ChainFamily::Sui => write!(f, "sui"),
            ChainFamily::Custom(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for ChainFamily {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "aptos" => ChainFamily::Aptos,
            "sui" => ChainFamily::Sui,
            other => ChainFamily::Custom(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trip() {
        for family in [ChainFamily::Aptos, ChainFamily::Sui] {
            assert_eq!(family.to_string().parse::<ChainFamily>().unwrap(), family);
        }
        assert_eq!(
            "movement".parse::<ChainFamily>().unwrap(),
            ChainFamily::Custom("movement".into())
        );
    }
}
