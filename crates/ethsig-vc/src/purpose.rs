//! # Proof Purposes
//!
//! A purpose stamps purpose-specific members onto a proof under
//! construction and later checks them on verification. The engine treats
//! purposes as an injected capability.

use serde_json::Value;

use crate::error::SuiteError;
use crate::proof::Proof;

/// Purpose updater and matcher.
pub trait ProofPurpose: Send + Sync {
    /// The `proofPurpose` term, e.g. `assertionMethod`.
    fn term(&self) -> &str;

    /// Attach purpose members to a proof being created.
    fn update(&self, proof: Proof, document: &Value) -> Proof;

    /// Check a received proof (signature removed) against this purpose.
    ///
    /// # Errors
    ///
    /// [`SuiteError::PurposeMismatch`] naming the failing member.
    fn matches(&self, proof: &Proof, document: &Value) -> Result<(), SuiteError>;
}

fn check_term(proof: &Proof, expected: &str) -> Result<(), SuiteError> {
    match proof.proof_purpose.as_deref() {
        Some(term) if term == expected => Ok(()),
        Some(term) => Err(SuiteError::PurposeMismatch(format!(
            "expected proofPurpose {expected:?}, found {term:?}"
        ))),
        None => Err(SuiteError::PurposeMismatch(format!(
            "expected proofPurpose {expected:?}, found none"
        ))),
    }
}

/// `assertionMethod`: the signer asserts the document's claims.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssertionMethodPurpose;

impl ProofPurpose for AssertionMethodPurpose {
    fn term(&self) -> &str {
        "assertionMethod"
    }

    fn update(&self, mut proof: Proof, _document: &Value) -> Proof {
        proof.proof_purpose = Some(self.term().to_string());
        proof
    }

    fn matches(&self, proof: &Proof, _document: &Value) -> Result<(), SuiteError> {
        check_term(proof, self.term())
    }
}

/// `authentication`: the signer proves control in answer to a challenge,
/// optionally bound to a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationPurpose {
    pub challenge: String,
    pub domain: Option<String>,
}

impl AuthenticationPurpose {
    pub fn new(challenge: impl Into<String>) -> Self {
        Self {
            challenge: challenge.into(),
            domain: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

impl ProofPurpose for AuthenticationPurpose {
    fn term(&self) -> &str {
        "authentication"
    }

    fn update(&self, mut proof: Proof, _document: &Value) -> Proof {
        proof.proof_purpose = Some(self.term().to_string());
        proof
            .extra
            .insert("challenge".into(), Value::String(self.challenge.clone()));
        if let Some(domain) = &self.domain {
            proof
                .extra
                .insert("domain".into(), Value::String(domain.clone()));
        }
        proof
    }

    fn matches(&self, proof: &Proof, _document: &Value) -> Result<(), SuiteError> {
        check_term(proof, self.term())?;

        if proof.extra.get("challenge").and_then(Value::as_str) != Some(self.challenge.as_str()) {
            return Err(SuiteError::PurposeMismatch(
                "challenge does not match".into(),
            ));
        }
        if let Some(expected) = &self.domain {
            if proof.extra.get("domain").and_then(Value::as_str) != Some(expected.as_str()) {
                return Err(SuiteError::PurposeMismatch("domain does not match".into()));
            }
        }
        Ok(())
    }
}
