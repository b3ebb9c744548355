use std::borrow::{Borrow, Cow};
use std::fmt;
use std::ops::Deref;

use miette::Diagnostic;
use thiserror::Error;

/// Longest mechanism name SASL allows.
pub const MAX_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Diagnostic)]
pub enum MechanismNameError {
    #[error("mechanism names can not be empty")]
    #[diagnostic(code(sasl::mechname::empty))]
    Empty,

    #[error("mechanism name is {0} characters long, at most 20 are allowed")]
    #[diagnostic(code(sasl::mechname::too_long))]
    TooLong(usize),

    #[error("invalid byte {byte:#04x} at position {index} in mechanism name")]
    #[diagnostic(
        code(sasl::mechname::invalid_byte),
        help("mechanism names consist of upper-case letters, digits, '-' and '_'")
    )]
    InvalidByte { index: usize, byte: u8 },
}

/// A SASL mechanism name such as `PLAIN`.
///
/// Names are case-sensitive and compared byte-for-byte. A `Mechname` can only be built from
/// a string that is 1 to 20 characters of `A-Z`, `0-9`, `-` and `_`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mechname(Cow<'static, str>);

impl Mechname {
    /// Build a name from a static string without validating it.
    ///
    /// Intended for constants. Passing a string that [`Mechname::parse`] would reject makes a
    /// name no client can ever ask for.
    pub const fn const_new_unchecked(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn parse(name: &str) -> Result<Self, MechanismNameError> {
        validate(name)?;
        Ok(Self(Cow::Owned(name.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate(name: &str) -> Result<(), MechanismNameError> {
    if name.is_empty() {
        return Err(MechanismNameError::Empty);
    }
    if name.len() > MAX_LEN {
        return Err(MechanismNameError::TooLong(name.len()));
    }
    match name
        .bytes()
        .enumerate()
        .find(|(_, b)| !matches!(b, b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_'))
    {
        Some((index, byte)) => Err(MechanismNameError::InvalidByte { index, byte }),
        None => Ok(()),
    }
}

impl Deref for Mechname {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for Mechname {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for Mechname {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for Mechname {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Mechname {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl TryFrom<&str> for Mechname {
    type Error = MechanismNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl std::str::FromStr for Mechname {
    type Err = MechanismNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Mechname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Mechname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mechname({})", self.as_str())
    }
}
