//! Raw delivery and restaurant addresses used as geocode cache keys.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Free-text address exactly as a user entered it.
///
/// Addresses are compared by exact string equality; no case folding or
/// whitespace normalisation is applied, so the cache key is the raw text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Construct an address after checking it is not blank.
    pub fn new(value: impl Into<String>) -> Result<Self, AddressValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(AddressValidationError::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying address text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for Address {
    type Error = AddressValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

/// Validation errors returned when constructing [`Address`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressValidationError {
    /// Address is empty after trimming whitespace.
    #[error("address must not be empty")]
    Empty,
}
