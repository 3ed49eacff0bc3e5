//! Text encodings accepted for binary input.

use base64::Engine as _;
use movecodec_core::BcsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// With or without a `0x` prefix.
    #[default]
    Hex,
    Base64,
    Base58,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Base64 => "base64",
            Self::Base58 => "base58",
        }
    }

    /// Decode `text` into raw bytes.
    pub fn decode(&self, text: &str) -> Result<Vec<u8>, BcsError> {
        let text = text.trim();
        let invalid = |reason: String| BcsError::InvalidEncoding {
            encoding: self.as_str().to_string(),
            reason,
        };
        match self {
            Self::Hex => {
                let digits = text.strip_prefix("0x").unwrap_or(text);
                hex::decode(digits).map_err(|e| invalid(e.to_string()))
            }
            Self::Base64 => base64::engine::general_purpose::STANDARD
                .decode(text)
                .map_err(|e| invalid(e.to_string())),
            Self::Base58 => bs58::decode(text)
                .into_vec()
                .map_err(|e| invalid(e.to_string())),
        }
    }

    /// Encode bytes; hex output carries a `0x` prefix.
    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            Self::Hex => format!("0x{}", hex::encode(bytes)),
            Self::Base64 => base64::engine::general_purpose::STANDARD.encode(bytes),
            Self::Base58 => bs58::encode(bytes).into_string(),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = BcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            "base58" => Ok(Self::Base58),
            other => Err(BcsError::InvalidEncoding {
                encoding: other.to_string(),
                reason: "expected hex, base64 or base58".into(),
            }),
        }
    }
}
