//! Type-safe identifiers.
//!
//! Locally generated entities (players, crop instances, ledger operations)
//! use UUID v7 newtypes so identifiers cannot be mixed at compile time.
//! Remote players are identified by their wallet [`PlayerAddress`].

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier of a locally simulated player profile.
    PlayerId
}

define_id! {
    /// Identifier of a single planted crop instance.
    CropId
}

define_id! {
    /// Identifier of a state-changing call submitted to the ledger.
    OperationId
}

/// Number of hex digits in a wallet address after the `0x` prefix.
const ADDRESS_HEX_LEN: usize = 40;

/// Error returned when a wallet address string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid wallet address {input:?}: expected 0x followed by 40 hex digits")]
pub struct AddressParseError {
    /// The rejected input.
    pub input: String,
}

/// A wallet address identifying a player on the remote ledger.
///
/// Always stored normalized: lowercase, with the `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(try_from = "String", into = "String")]
#[ts(export, export_to = "bindings/")]
pub struct PlayerAddress(String);

impl PlayerAddress {
    /// Return the normalized address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PlayerAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| AddressParseError {
                input: s.to_owned(),
            })?;

        if hex.len() != ADDRESS_HEX_LEN || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressParseError {
                input: s.to_owned(),
            });
        }

        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }
}

impl TryFrom<String> for PlayerAddress {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlayerAddress> for String {
    fn from(address: PlayerAddress) -> Self {
        address.0
    }
}

impl core::fmt::Display for PlayerAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct() {
        let a = CropId::new();
        let b = CropId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }

    #[test]
    fn address_is_normalized() {
        let parsed = "0x59DB61AF8500A5DF9BD65AAD9611ABACEF261669".parse::<PlayerAddress>();
        assert_eq!(
            parsed.map(|a| a.to_string()),
            Ok("0x59db61af8500a5df9bd65aad9611abacef261669".to_owned())
        );
    }

    #[test]
    fn address_rejects_bad_input() {
        assert!("59db61af8500a5df9bd65aad9611abacef261669".parse::<PlayerAddress>().is_err());
        assert!("0x1234".parse::<PlayerAddress>().is_err());
        assert!("0xzzdb61af8500a5df9bd65aad9611abacef261669".parse::<PlayerAddress>().is_err());
    }

    #[test]
    fn address_serde_uses_plain_string() {
        let address: Result<PlayerAddress, _> =
            serde_json::from_str("\"0x00000000000000000000000000000000000000aa\"");
        assert!(address.is_ok());
        let bad: Result<PlayerAddress, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }
}
