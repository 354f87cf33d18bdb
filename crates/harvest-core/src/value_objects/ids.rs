//! Source-assigned identifiers
//!
//! Channels and messages are identified by 64-bit integers handed out by the
//! message source. Message ids grow monotonically within a channel, which is
//! what the cursor relies on.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Error when parsing an id from its string form
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("invalid id format")]
    InvalidFormat,
}

macro_rules! source_id {
    ($(#[$meta:meta])* $name:ident, $what:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(i64);

        impl $name {
            /// Create from a raw i64 value
            #[inline]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the inner i64 value
            #[inline]
            pub const fn into_inner(self) -> i64 {
                self.0
            }

            /// Parse from string representation
            pub fn parse(s: &str) -> Result<Self, IdParseError> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| IdParseError::InvalidFormat)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_i64(self.0)
            }
        }

        // Bridges are free to send ids as JSON strings (JavaScript BigInt safety)
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                use serde::de::{self, Visitor};

                struct IdVisitor;

                impl<'de> Visitor<'de> for IdVisitor {
                    type Value = $name;

                    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                        formatter.write_str(concat!("a string or integer representing a ", $what))
                    }

                    fn visit_i64<E>(self, value: i64) -> Result<$name, E>
                    where
                        E: de::Error,
                    {
                        Ok($name(value))
                    }

                    fn visit_u64<E>(self, value: u64) -> Result<$name, E>
                    where
                        E: de::Error,
                    {
                        i64::try_from(value)
                            .map($name)
                            .map_err(|_| de::Error::custom(concat!($what, " out of range")))
                    }

                    fn visit_str<E>(self, value: &str) -> Result<$name, E>
                    where
                        E: de::Error,
                    {
                        $name::parse(value)
                            .map_err(|_| de::Error::custom(concat!("invalid ", $what, " string")))
                    }
                }

                deserializer.deserialize_any(IdVisitor)
            }
        }
    };
}

source_id!(
    /// Source-assigned channel identifier
    ChannelId,
    "channel id"
);

source_id!(
    /// Source-assigned message identifier, unique and increasing within a channel
    MessageId,
    "message id"
);

impl MessageId {
    /// The id immediately before this one (saturating at zero)
    #[inline]
    pub const fn prev(self) -> Self {
        if self.0 > 0 {
            Self(self.0 - 1)
        } else {
            Self(0)
        }
    }

    /// The id immediately after this one
    #[inline]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Identity of one logical post inside a channel
///
/// Messages that belong to a multi-message post share a group marker; a
/// message without one forms its own group, keyed by its own id. The two
/// variants never compare equal, so a marker value that happens to equal a
/// message id cannot collapse two unrelated groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Marker(i64),
    Single(MessageId),
}

impl GroupKey {
    /// Value stored in the post's `group_id` column
    pub const fn storage_value(self) -> i64 {
        match self {
            Self::Marker(marker) => marker,
            Self::Single(id) => id.into_inner(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marker(marker) => write!(f, "group:{marker}"),
            Self::Single(id) => write!(f, "message:{id}"),
        }
    }
}
