//! Route number type.

use std::fmt;

/// Error returned when a route number is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route number {value}: must be a positive integer")]
pub struct InvalidRouteNumber {
    value: i64,
}

/// The public number of a route, e.g. the "42" in "Route No. 42".
///
/// Route numbers are positive integers. Uniqueness is not required.
///
/// # Examples
///
/// ```
/// use route_server::domain::RouteNumber;
///
/// let n = RouteNumber::new(42).unwrap();
/// assert_eq!(n.get(), 42);
///
/// assert!(RouteNumber::new(0).is_err());
/// assert!(RouteNumber::new(-3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteNumber(u32);

impl RouteNumber {
    /// Validate a raw route number.
    pub fn new(value: i64) -> Result<Self, InvalidRouteNumber> {
        match u32::try_from(value) {
            Ok(n) if n > 0 => Ok(Self(n)),
            _ => Err(InvalidRouteNumber { value }),
        }
    }

    /// Returns the number as an integer.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RouteNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
