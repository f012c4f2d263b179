//! # Identity Newtypes
//!
//! Identifiers that name a signer.
//!
//! [`VerificationMethodId`] is the proof's `verificationMethod` string. It may
//! be a DID URL (`did:ethr:0xAbC...#controller`), a CAIP-style DID
//! (`did:pkh:eip155:1:0xAbC...`), or a bare address with a fragment
//! (`0xAbC...#controller`).
//!
//! Identity comparison never looks at the full string. Only the bare
//! address segment participates, compared case-insensitively, so that an
//! EIP-55 checksummed recovery result matches a lowercase DID.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The `verificationMethod` identifier of a proof.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VerificationMethodId(String);

impl VerificationMethodId {
    /// Wrap a verification method identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidVerificationMethod`] if the value is
    /// empty or contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidVerificationMethod(s));
        }
        Ok(Self(s))
    }

    /// Access the full identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier with any `#fragment` removed.
    pub fn without_fragment(&self) -> &str {
        self.0.split('#').next().unwrap_or(&self.0)
    }

    /// The bare address segment used for identity comparison.
    ///
    /// Strips the fragment, any query, and any `did:<method>:` prefix
    /// (including multi-segment method-specific ids such as
    /// `did:pkh:eip155:1:<address>`, of which the last segment is kept).
    pub fn bare_address(&self) -> &str {
        let base = self.without_fragment();
        let base = base.split('?').next().unwrap_or(base);
        if base.starts_with("did:") {
            base.rsplit(':').next().unwrap_or(base)
        } else {
            base
        }
    }
}

impl TryFrom<String> for VerificationMethodId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VerificationMethodId> for String {
    fn from(value: VerificationMethodId) -> Self {
        value.0
    }
}

impl std::fmt::Display for VerificationMethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Case-insensitive comparison of two bare addresses.
pub fn addresses_match(a: &str, b: &str) -> bool {
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}
