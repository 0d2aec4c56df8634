//! Asset GUID type with validation.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Number of hexadecimal characters in a GUID.
pub const GUID_LEN: usize = 32;

/// A validated asset identifier: 32 lowercase hexadecimal characters.
///
/// Uppercase input is accepted and normalized to lowercase, which is the form
/// written to package entry names and `guid:` sidecar lines.
///
/// # Examples
///
/// ```
/// use unipkg::Guid;
///
/// let guid = Guid::parse("0123456789ABCDEF0123456789abcdef").unwrap();
/// assert_eq!(guid.as_str(), "0123456789abcdef0123456789abcdef");
///
/// assert!(Guid::parse("not-a-guid").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Guid(String);

impl Guid {
    /// Parses a GUID, accepting either letter case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGuid`] unless the input is exactly 32 ASCII
    /// hexadecimal digits.
    pub fn parse(s: &str) -> Result<Self> {
        if is_guid(s) {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(Error::InvalidGuid(s.to_string()))
        }
    }

    /// Generates a random GUID from 128 bits of entropy.
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::random();
        let mut s = String::with_capacity(GUID_LEN);
        for b in bytes {
            s.push_str(&format!("{:02x}", b));
        }
        Self(s)
    }

    /// Returns the GUID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns `true` if `s` is exactly 32 ASCII hex digits (either case).
pub fn is_guid(s: &str) -> bool {
    s.len() == GUID_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Guid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for Guid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Guid {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
