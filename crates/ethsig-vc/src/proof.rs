//! # Proof Object
//!
//! The wire shape of an `EthereumEip712Signature2021` proof:
//!
//! ```json
//! {
//!   "type": "EthereumEip712Signature2021",
//!   "created": "2021-08-30T13:28:02Z",
//!   "verificationMethod": "did:pkh:eip155:1:0xAED7...#blockchainAccountId",
//!   "proofPurpose": "assertionMethod",
//!   "proofValue": "0x...",
//!   "eip712Domain": {
//!     "domain": {"name": "..."},
//!     "messageSchema": {"Document": [...]},
//!     "primaryType": "Document"
//!   }
//! }
//! ```
//!
//! `messageSchema` is either the inline type schema or a URI resolved
//! through a [`DocumentLoader`](crate::DocumentLoader). Purpose-specific
//! members (`challenge`, `domain`, ...) land in [`Proof::extra`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use ethsig_crypto::Eip712Domain;
use ethsig_schema::TypeSchema;

/// Proof type produced and accepted by this suite.
pub const PROOF_TYPE: &str = "EthereumEip712Signature2021";

/// Proof member holding the signature.
pub const PROOF_VALUE_KEY: &str = "proofValue";

/// A linked-data proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "type")]
    pub proof_type: String,

    /// UTC creation time, `YYYY-MM-DDTHH:MM:SSZ`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<VerificationMethod>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_purpose: Option<String>,

    /// `0x`-prefixed 65-byte `r ‖ s ‖ v` signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,

    /// The signing context, embedded so a verifier need not re-derive it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eip712_domain: Option<EmbeddedDomain>,

    /// Purpose-specific and unrecognized members.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Proof {
    /// An empty proof of the given type.
    pub fn new(proof_type: impl Into<String>) -> Self {
        Self {
            proof_type: proof_type.into(),
            created: None,
            verification_method: None,
            proof_purpose: None,
            proof_value: None,
            eip712_domain: None,
            extra: BTreeMap::new(),
        }
    }

    /// The verification method identifier, from either the string form or
    /// the `id` of the object form.
    pub fn verification_method_id(&self) -> Option<&str> {
        self.verification_method.as_ref().and_then(VerificationMethod::id)
    }

    /// A copy with the signature removed.
    pub fn without_proof_value(&self) -> Proof {
        Proof {
            proof_value: None,
            ..self.clone()
        }
    }
}

/// `verificationMethod`: a URI string or an object carrying `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerificationMethod {
    Id(String),
    Object(VerificationMethodObject),
}

impl VerificationMethod {
    pub fn id(&self) -> Option<&str> {
        match self {
            VerificationMethod::Id(id) => Some(id),
            VerificationMethod::Object(object) => object.id.as_deref(),
        }
    }
}

impl From<String> for VerificationMethod {
    fn from(id: String) -> Self {
        VerificationMethod::Id(id)
    }
}

/// Object form of a verification method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationMethodObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// The `eip712Domain` proof member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedDomain {
    pub domain: Eip712Domain,
    pub message_schema: SchemaSource,
    pub primary_type: String,
}

/// A type schema given inline or by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaSource {
    Inline(TypeSchema),
    Remote(String),
}

impl From<TypeSchema> for SchemaSource {
    fn from(schema: TypeSchema) -> Self {
        SchemaSource::Inline(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "type": PROOF_TYPE,
            "created": "2021-08-30T13:28:02Z",
            "verificationMethod": "did:pkh:eip155:1:0xaed7ea8035eec47e657b34ef5d020c7005487443#blockchainAccountId",
            "proofPurpose": "assertionMethod",
            "proofValue": "0xdead",
            "eip712Domain": {
                "domain": {"name": "Test"},
                "messageSchema": {"Document": [{"name": "a", "type": "string"}]},
                "primaryType": "Document"
            }
        })
    }

    #[test]
    fn deserializes_full_proof() {
        let proof: Proof = serde_json::from_value(sample()).unwrap();
        assert_eq!(proof.proof_type, PROOF_TYPE);
        assert_eq!(proof.proof_purpose.as_deref(), Some("assertionMethod"));
        assert!(proof.verification_method_id().unwrap().ends_with("#blockchainAccountId"));
        let embedded = proof.eip712_domain.unwrap();
        assert_eq!(embedded.primary_type, "Document");
        assert!(matches!(embedded.message_schema, SchemaSource::Inline(ref s) if s.contains("Document")));
        assert!(proof.extra.is_empty());
    }

    #[test]
    fn serialization_roundtrips() {
        let proof: Proof = serde_json::from_value(sample()).unwrap();
        assert_eq!(serde_json::to_value(&proof).unwrap(), sample());
    }

    #[test]
    fn schema_uri_is_remote() {
        let mut value = sample();
        value["eip712Domain"]["messageSchema"] = json!("https://example.com/schemas/v1");
        let proof: Proof = serde_json::from_value(value).unwrap();
        assert_eq!(
            proof.eip712_domain.unwrap().message_schema,
            SchemaSource::Remote("https://example.com/schemas/v1".into())
        );
    }

    #[test]
    fn verification_method_object_form() {
        let mut value = sample();
        value["verificationMethod"] = json!({"id": "did:example:0xabc#key-1", "type": "EcdsaSecp256k1RecoveryMethod2020"});
        let proof: Proof = serde_json::from_value(value).unwrap();
        assert_eq!(proof.verification_method_id(), Some("did:example:0xabc#key-1"));

        let mut value = sample();
        value["verificationMethod"] = json!({"type": "EcdsaSecp256k1RecoveryMethod2020"});
        let proof: Proof = serde_json::from_value(value).unwrap();
        assert!(proof.verification_method.is_some());
        assert_eq!(proof.verification_method_id(), None);
    }

    #[test]
    fn purpose_members_are_kept() {
        let mut value = sample();
        value["challenge"] = json!("abc");
        value["domain"] = json!("example.com");
        let proof: Proof = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(proof.extra["challenge"], "abc");
        assert_eq!(proof.extra["domain"], "example.com");
        assert_eq!(serde_json::to_value(&proof).unwrap(), value);
    }

    #[test]
    fn without_proof_value_strips_only_signature() {
        let proof: Proof = serde_json::from_value(sample()).unwrap();
        let stripped = proof.without_proof_value();
        assert!(stripped.proof_value.is_none());
        assert_eq!(stripped.created, proof.created);
        let json = serde_json::to_value(&stripped).unwrap();
        assert!(json.get(PROOF_VALUE_KEY).is_none());
    }

    #[test]
    fn new_proof_serializes_type_only() {
        assert_eq!(
            serde_json::to_value(Proof::new(PROOF_TYPE)).unwrap(),
            json!({"type": PROOF_TYPE})
        );
    }
}
