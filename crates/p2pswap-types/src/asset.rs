//! Asset identity.
//!
//! A swap moves either the base coin of the host chain or a token issued by
//! a contract. Tokens are identified by the issuing contract plus the asset
//! name inside that contract; two references are the same asset only when
//! both parts match.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What is being moved: the native coin, or a contract-issued token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetRef {
    /// The base fungible asset. Has no contract reference.
    NativeCoin,
    /// A fungible token issued by `contract` under `name`.
    Token { contract: String, name: String },
}

impl AssetRef {
    #[must_use]
    pub fn token(contract: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Token {
            contract: contract.into(),
            name: name.into(),
        }
    }

    /// Build from the wire representation, where an absent contract
    /// reference denotes the native coin and the name is ignored.
    #[must_use]
    pub fn from_parts(contract: Option<&str>, name: &str) -> Self {
        match contract {
            None => Self::NativeCoin,
            Some(contract) => Self::token(contract, name),
        }
    }

    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, Self::NativeCoin)
    }

    /// The issuing contract, or `None` for the native coin.
    #[must_use]
    pub fn contract(&self) -> Option<&str> {
        match self {
            Self::NativeCoin => None,
            Self::Token { contract, .. } => Some(contract),
        }
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NativeCoin => write!(f, "native"),
            Self::Token { contract, name } => write!(f, "token:{contract}::{name}"),
        }
    }
}
