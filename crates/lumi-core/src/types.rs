use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::stage::Stage;

/// Implements hex display, parsing and string serde for a 32-byte newtype.
macro_rules! hex_bytes32 {
    ($name:ident, $what:literal) => {
        impl $name {
            /// Raw bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Encode as lowercase hex.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Decode from hex, with or without a `0x` prefix.
            pub fn from_hex(s: &str) -> Result<Self, CoreError> {
                let trimmed = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(trimmed).map_err(|e| {
                    CoreError::InvalidIdentity(format!(concat!("invalid ", $what, " hex: {}"), e))
                })?;
                let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
                    CoreError::InvalidIdentity(format!(
                        concat!($what, " must be 32 bytes, got {}"),
                        bytes.len()
                    ))
                })?;
                Ok(Self(arr))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// External account reference: the 32-byte Ed25519 verifying key of the
/// account. Owners, issuers and credential holders are all identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(pub [u8; 32]);

hex_bytes32!(Identity, "identity");

/// Identifier of one registry instance, bound into every authorization
/// digest so signatures cannot be replayed against another deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistryId(pub [u8; 32]);

hex_bytes32!(RegistryId, "registry id");

/// Sequential credential identifier, assigned from 0 in mint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(pub u64);

impl CredentialId {
    pub fn value(self) -> u64 {
        self.0
    }

    /// The id following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A soulbound credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: CredentialId,
    pub owner: Identity,
    pub stage: Stage,
}

/// Domain-separation parameters for authorization digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// System name, e.g. "LumiCredential".
    pub name: String,
    /// Authorization scheme version, e.g. "1.0".
    pub version: String,
    /// Execution-context identifier (network / environment).
    pub context_id: u64,
    /// Registry instance the authorization is bound to.
    pub registry: RegistryId,
}
