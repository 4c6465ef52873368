//! Identifier types for stops, routes and route stops.
//!
//! Identifiers are opaque strings chosen by the client, typically UUIDs.
//! They are validated once at the boundary so the rest of the crate never
//! has to re-check them.

use std::fmt;

/// Maximum length of an identifier, in bytes.
pub const MAX_ID_LEN: usize = 128;

/// Error returned when parsing an invalid identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} id: {reason}")]
pub struct InvalidId {
    kind: &'static str,
    reason: &'static str,
}

impl InvalidId {
    /// Which kind of identifier was rejected ("stop", "route", ...).
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

fn check_id(kind: &'static str, s: &str) -> Result<(), InvalidId> {
    if s.is_empty() {
        return Err(InvalidId {
            kind,
            reason: "must not be empty",
        });
    }
    if s.len() > MAX_ID_LEN {
        return Err(InvalidId {
            kind,
            reason: "too long",
        });
    }
    if s.chars().any(|c| c.is_whitespace() || c.is_control() || c == '/') {
        return Err(InvalidId {
            kind,
            reason: "must not contain whitespace, control characters or '/'",
        });
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Parse an identifier, rejecting empty or malformed input.
            pub fn parse(s: &str) -> Result<Self, InvalidId> {
                check_id($kind, s)?;
                Ok(Self(s.to_string()))
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a [`Stop`](super::Stop) in the stop graph.
    StopId,
    "stop"
);

string_id!(
    /// Identifier of a [`Route`](super::Route).
    RouteId,
    "route"
);

string_id!(
    /// Identifier of one occurrence of a stop within a route.
    RouteStopId,
    "route stop"
);
