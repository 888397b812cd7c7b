//! Index data model and the tagged IndexedValue encoding

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CodecError, IndexError, IndexResult};

/// Discriminator of a Location payload (`'l'`)
pub const LOCATION_PREFIX: u8 = 0x6C;

/// Discriminator of a Keyword payload (`'w'`)
pub const KEYWORD_PREFIX: u8 = 0x77;

macro_rules! byte_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Vec<u8>);

        impl $name {
            pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
                Self(bytes.into())
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn into_bytes(self) -> Vec<u8> {
                self.0
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.as_bytes().to_vec())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value.into_bytes())
            }
        }

        impl From<Vec<u8>> for $name {
            fn from(value: Vec<u8>) -> Self {
                Self(value)
            }
        }

        impl From<&[u8]> for $name {
            fn from(value: &[u8]) -> Self {
                Self(value.to_vec())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match std::str::from_utf8(&self.0) {
                    Ok(s) => write!(f, "{}({:?})", stringify!($name), s),
                    Err(_) => write!(f, "{}(0x{})", stringify!($name), hex::encode(&self.0)),
                }
            }
        }
    };
}

byte_newtype!(
    /// Public byte string bound into every derivation of one index generation
    Label
);

byte_newtype!(
    /// Search key; sanitized by the caller before indexing and searching
    Keyword
);

byte_newtype!(
    /// Terminal search result (e.g. a database row UID)
    Location
);

impl Keyword {
    /// Lossy UTF-8 rendering
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl Location {
    /// 8-byte big-endian encoding of a number
    pub fn from_u64(value: u64) -> Self {
        Self(value.to_be_bytes().to_vec())
    }

    /// Decode a location created with [`Location::from_u64`]
    pub fn to_u64(&self) -> IndexResult<u64> {
        let bytes: [u8; 8] = self.0.as_slice().try_into().map_err(|_| {
            IndexError::InvalidArgument(format!(
                "location is {} bytes, 8 bytes expected for a number",
                self.0.len()
            ))
        })?;
        Ok(u64::from_be_bytes(bytes))
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id.as_bytes().to_vec())
    }

    pub fn to_uuid(&self) -> IndexResult<Uuid> {
        Uuid::from_slice(&self.0)
            .map_err(|e| IndexError::InvalidArgument(format!("location is not a UUID: {}", e)))
    }

    /// Lossy UTF-8 rendering
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

/// Opaque symmetric key material (search key or update key)
///
/// Never inspected here, only forwarded to the engine.
#[derive(Clone, PartialEq, Eq)]
pub struct FindexKey(Vec<u8>);

impl FindexKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for FindexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FindexKey([REDACTED; {} bytes])", self.0.len())
    }
}

/// Kind half of the IndexedValue union
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexedValueKind {
    Location,
    Keyword,
}

impl IndexedValueKind {
    pub fn prefix(self) -> u8 {
        match self {
            IndexedValueKind::Location => LOCATION_PREFIX,
            IndexedValueKind::Keyword => KEYWORD_PREFIX,
        }
    }
}

/// Prepend the discriminator of `kind` to `payload`
pub fn encode_indexed_value(kind: IndexedValueKind, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 1);
    out.push(kind.prefix());
    out.extend_from_slice(payload);
    out
}

/// Split an encoded value into its kind and payload
///
/// # Errors
///
/// `MalformedIndexedValue` on empty input or an unknown discriminator.
pub fn decode_indexed_value(bytes: &[u8]) -> Result<(IndexedValueKind, &[u8]), CodecError> {
    match bytes.split_first() {
        Some((&LOCATION_PREFIX, payload)) => Ok((IndexedValueKind::Location, payload)),
        Some((&KEYWORD_PREFIX, payload)) => Ok((IndexedValueKind::Keyword, payload)),
        Some((other, _)) => Err(CodecError::MalformedIndexedValue(format!(
            "unknown discriminator 0x{:02x}",
            other
        ))),
        None => Err(CodecError::MalformedIndexedValue("empty input".into())),
    }
}

/// What a search result points to: a terminal Location, or a Keyword to follow
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexedValue {
    Location(Location),
    Keyword(Keyword),
}

impl IndexedValue {
    pub fn kind(&self) -> IndexedValueKind {
        match self {
            IndexedValue::Location(_) => IndexedValueKind::Location,
            IndexedValue::Keyword(_) => IndexedValueKind::Keyword,
        }
    }

    pub fn payload(&self) -> &[u8] {
        match self {
            IndexedValue::Location(l) => l.as_bytes(),
            IndexedValue::Keyword(k) => k.as_bytes(),
        }
    }

    /// Discriminator byte followed by the payload
    pub fn to_bytes(&self) -> Vec<u8> {
        encode_indexed_value(self.kind(), self.payload())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let (kind, payload) = decode_indexed_value(bytes)?;
        Ok(match kind {
            IndexedValueKind::Location => IndexedValue::Location(Location::from(payload)),
            IndexedValueKind::Keyword => IndexedValue::Keyword(Keyword::from(payload)),
        })
    }

    pub fn as_location(&self) -> Option<&Location> {
        match self {
            IndexedValue::Location(l) => Some(l),
            IndexedValue::Keyword(_) => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&Keyword> {
        match self {
            IndexedValue::Keyword(k) => Some(k),
            IndexedValue::Location(_) => None,
        }
    }
}

impl From<Location> for IndexedValue {
    fn from(value: Location) -> Self {
        IndexedValue::Location(value)
    }
}

impl From<Keyword> for IndexedValue {
    fn from(value: Keyword) -> Self {
        IndexedValue::Keyword(value)
    }
}

/// One value and the keywords it must be discoverable under
///
/// Input only: the engine turns it into Entry/Chain rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedEntry {
    pub value: IndexedValue,
    pub keywords: BTreeSet<Keyword>,
}

impl IndexedEntry {
    pub fn new<K, I>(value: impl Into<IndexedValue>, keywords: I) -> Self
    where
        K: Into<Keyword>,
        I: IntoIterator<Item = K>,
    {
        Self {
            value: value.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// Index `location` under `keywords`
    pub fn location<K, I>(location: impl Into<Location>, keywords: I) -> Self
    where
        K: Into<Keyword>,
        I: IntoIterator<Item = K>,
    {
        Self::new(IndexedValue::Location(location.into()), keywords)
    }

    /// Make searches for `source` follow through to `destination`
    pub fn keyword_link(source: impl Into<Keyword>, destination: impl Into<Keyword>) -> Self {
        Self::new(
            IndexedValue::Keyword(destination.into()),
            std::iter::once(source.into()),
        )
    }
}
