//! # EthereumEip712Signature2021 Suite
//!
//! Creates and verifies proofs whose signature is an EIP-712 typed-data
//! signature over the document itself:
//!
//! ```text
//! create: proof{type} → created, verificationMethod → purpose.update
//!         → types (caller or derived) → {domain, types, primaryType, message = document}
//!         → canonicalize proof (no proofValue) and envelope → signer → proofValue
//!         → eip712Domain (when embedding)
//!
//! verify: proof type / proofValue / verificationMethod present
//!         → domain, types, primaryType from options, then eip712Domain, then derivation
//!         → same envelope → recover signer → compare bare addresses → purpose.matches
//! ```
//!
//! Verification never returns an error. Every failure is folded into
//! [`ProofVerification`] so a host treats "invalid" and "could not be
//! checked" alike while keeping the cause.
//!
//! The signer, verifier, purpose and loader are injected; the suite holds
//! no mutable state and is safe to share across concurrent calls.

use std::sync::Arc;

use serde_json::Value;

use ethsig_core::{
    addresses_match, w3c_date, CanonicalBytes, DateInput, Timestamp, VerificationMethodId,
};
use ethsig_crypto::{keccak256, Eip712Domain, Eip712Recovery, TypedData, TypedDataSigner, TypedDataVerifier};
use ethsig_schema::{derive_types, TypeSchema, ROOT_TYPE};

use crate::error::SuiteError;
use crate::loader::DocumentLoader;
use crate::proof::{EmbeddedDomain, Proof, SchemaSource, VerificationMethod, PROOF_TYPE, PROOF_VALUE_KEY};
use crate::purpose::ProofPurpose;

/// Construction options.
#[derive(Default)]
pub struct SuiteOptions {
    pub signer: Option<Arc<dyn TypedDataSigner>>,
    /// Default verification method for created proofs.
    pub verification_method: Option<String>,
    /// Fixed creation date for created proofs; `None` uses the current time.
    pub date: Option<DateInput>,
}

/// Options for [`Eip712Signature2021::create_proof`].
pub struct CreateProofOptions<'a> {
    pub purpose: &'a dyn ProofPurpose,
    pub verification_method: Option<String>,
    pub date: Option<DateInput>,
    pub domain: Option<Eip712Domain>,
    pub types: Option<TypeSchema>,
    pub primary_type: Option<String>,
    /// Store `eip712Domain` on the proof. Defaults to `true`.
    pub embed: bool,
}

impl<'a> CreateProofOptions<'a> {
    pub fn new(purpose: &'a dyn ProofPurpose) -> Self {
        Self {
            purpose,
            verification_method: None,
            date: None,
            domain: None,
            types: None,
            primary_type: None,
            embed: true,
        }
    }

    pub fn verification_method(mut self, verification_method: impl Into<String>) -> Self {
        self.verification_method = Some(verification_method.into());
        self
    }

    pub fn date(mut self, date: DateInput) -> Self {
        self.date = Some(date);
        self
    }

    pub fn domain(mut self, domain: Eip712Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn types(mut self, types: TypeSchema, primary_type: impl Into<String>) -> Self {
        self.types = Some(types);
        self.primary_type = Some(primary_type.into());
        self
    }

    pub fn embed(mut self, embed: bool) -> Self {
        self.embed = embed;
        self
    }
}

/// Options for [`Eip712Signature2021::verify_proof`].
pub struct VerifyProofOptions<'a> {
    pub purpose: &'a dyn ProofPurpose,
    pub domain: Option<Eip712Domain>,
    pub types: Option<SchemaSource>,
    pub primary_type: Option<String>,
    pub document_loader: Option<&'a dyn DocumentLoader>,
}

impl<'a> VerifyProofOptions<'a> {
    pub fn new(purpose: &'a dyn ProofPurpose) -> Self {
        Self {
            purpose,
            domain: None,
            types: None,
            primary_type: None,
            document_loader: None,
        }
    }

    pub fn domain(mut self, domain: Eip712Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn types(mut self, types: impl Into<SchemaSource>) -> Self {
        self.types = Some(types.into());
        self
    }

    pub fn primary_type(mut self, primary_type: impl Into<String>) -> Self {
        self.primary_type = Some(primary_type.into());
        self
    }

    pub fn document_loader(mut self, loader: &'a dyn DocumentLoader) -> Self {
        self.document_loader = Some(loader);
        self
    }
}

/// The data a signature is computed over, plus the canonical proof.
#[derive(Debug, Clone)]
pub struct VerifyData {
    pub typed_data: TypedData,
    /// JCS form of the proof with `proofValue` and `eip712Domain` removed.
    /// Identical on the create and verify paths.
    pub canonical_proof: CanonicalBytes,
    /// JCS form of the typed-data envelope.
    pub canonical_envelope: CanonicalBytes,
}

impl VerifyData {
    /// Keccak-256 of the canonical proof.
    pub fn proof_digest(&self) -> [u8; 32] {
        keccak256(self.canonical_proof.as_bytes())
    }

    /// Keccak-256 of the canonical typed-data envelope.
    pub fn envelope_digest(&self) -> [u8; 32] {
        keccak256(self.canonical_envelope.as_bytes())
    }
}

/// Outcome of [`Eip712Signature2021::verify_proof`].
#[derive(Debug)]
pub struct ProofVerification {
    pub verified: bool,
    pub verification_method: Option<String>,
    pub recovered_address: Option<String>,
    pub error: Option<SuiteError>,
}

impl ProofVerification {
    /// `Ok(())` when verified, else the captured error.
    pub fn into_result(self) -> Result<(), SuiteError> {
        match (self.verified, self.error) {
            (true, _) => Ok(()),
            (false, Some(err)) => Err(err),
            (false, None) => Err(SuiteError::InvalidArgument(
                "verification failed without a recorded cause".into(),
            )),
        }
    }
}

/// The `EthereumEip712Signature2021` proof suite.
pub struct Eip712Signature2021 {
    signer: Option<Arc<dyn TypedDataSigner>>,
    verifier: Arc<dyn TypedDataVerifier>,
    verification_method: Option<VerificationMethodId>,
    date: Option<Timestamp>,
}

impl std::fmt::Debug for Eip712Signature2021 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Eip712Signature2021")
            .field("signer", &self.signer.as_ref().map(|s| s.address()))
            .field("verification_method", &self.verification_method)
            .field("date", &self.date)
            .finish_non_exhaustive()
    }
}

impl Eip712Signature2021 {
    /// Build a suite. Signature recovery defaults to [`Eip712Recovery`].
    ///
    /// # Errors
    ///
    /// [`SuiteError::InvalidArgument`] if the verification method is not a
    /// URI string or the date cannot be parsed.
    pub fn new(options: SuiteOptions) -> Result<Self, SuiteError> {
        let verification_method = options
            .verification_method
            .map(|vm| {
                VerificationMethodId::new(vm).map_err(|_| {
                    SuiteError::InvalidArgument("\"verificationMethod\" must be a URI string".into())
                })
            })
            .transpose()?;
        let date = options
            .date
            .as_ref()
            .map(Timestamp::try_from)
            .transpose()?;

        Ok(Self {
            signer: options.signer,
            verifier: Arc::new(Eip712Recovery),
            verification_method,
            date,
        })
    }

    /// Replace the signature-recovery capability.
    pub fn with_verifier(mut self, verifier: Arc<dyn TypedDataVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn proof_type(&self) -> &'static str {
        PROOF_TYPE
    }

    pub fn verification_method(&self) -> Option<&VerificationMethodId> {
        self.verification_method.as_ref()
    }

    /// Create a proof over `document`.
    ///
    /// # Errors
    ///
    /// Schema derivation, canonicalization, signing and argument errors
    /// propagate. No partial proof is returned.
    pub async fn create_proof(
        &self,
        document: &Value,
        options: CreateProofOptions<'_>,
    ) -> Result<Proof, SuiteError> {
        let mut proof = Proof::new(PROOF_TYPE);

        let created = match (&options.date, &self.date) {
            (Some(date), _) => w3c_date(Some(date))?,
            (None, Some(fixed)) => fixed.to_iso8601(),
            (None, None) => w3c_date(None)?,
        };
        proof.created = Some(created);

        let verification_method = match options.verification_method {
            Some(vm) => Some(VerificationMethodId::new(vm)?),
            None => self.verification_method.clone(),
        };
        proof.verification_method =
            verification_method.map(|vm| VerificationMethod::Id(vm.to_string()));

        let proof = options.purpose.update(proof, document);

        let (types, schema_source) = match options.types {
            Some(types) => (types, "caller"),
            None => (derive_types(document)?, "derived"),
        };
        let primary_type = options
            .primary_type
            .unwrap_or_else(|| ROOT_TYPE.to_string());
        let domain = options.domain.unwrap_or_default();

        tracing::debug!(
            schema_source,
            types = types.len(),
            primary_type = %primary_type,
            "resolved message schema"
        );

        let verify_data =
            self.create_verify_data(document, &proof, domain.clone(), types.clone(), &primary_type)?;
        let mut proof = self.sign(&verify_data, proof).await?;

        if options.embed {
            proof.eip712_domain = Some(EmbeddedDomain {
                domain,
                message_schema: SchemaSource::Inline(types),
                primary_type,
            });
        }

        tracing::info!(
            verification_method = proof.verification_method_id().unwrap_or_default(),
            embedded = options.embed,
            proof_digest = %hex::encode(verify_data.proof_digest()),
            envelope_digest = %hex::encode(verify_data.envelope_digest()),
            "created proof"
        );
        Ok(proof)
    }

    /// Verify `proof` against `document`. Never errors.
    pub async fn verify_proof(
        &self,
        proof: &Proof,
        document: &Value,
        options: VerifyProofOptions<'_>,
    ) -> ProofVerification {
        let verification_method = proof.verification_method_id().map(str::to_string);
        match self.try_verify(proof, document, options).await {
            Ok(recovered) => {
                tracing::info!(
                    verification_method = verification_method.as_deref().unwrap_or_default(),
                    recovered = %recovered,
                    "proof verified"
                );
                ProofVerification {
                    verified: true,
                    verification_method,
                    recovered_address: Some(recovered),
                    error: None,
                }
            }
            Err(err) => {
                tracing::warn!(
                    verification_method = verification_method.as_deref().unwrap_or_default(),
                    error = %err,
                    "proof verification failed"
                );
                let recovered_address = match &err {
                    SuiteError::SignatureMismatch { recovered, .. } => Some(recovered.clone()),
                    _ => None,
                };
                ProofVerification {
                    verified: false,
                    verification_method,
                    recovered_address,
                    error: Some(err),
                }
            }
        }
    }

    async fn try_verify(
        &self,
        proof: &Proof,
        document: &Value,
        options: VerifyProofOptions<'_>,
    ) -> Result<String, SuiteError> {
        if proof.proof_type != PROOF_TYPE {
            return Err(SuiteError::UnsupportedProofType(proof.proof_type.clone()));
        }
        let signature = proof
            .proof_value
            .as_deref()
            .ok_or(SuiteError::MissingProofValue)?;
        let verification_method = proof
            .verification_method_id()
            .ok_or(SuiteError::MissingVerificationMethod)?;

        let embedded = proof.eip712_domain.as_ref();
        let domain = options
            .domain
            .or_else(|| embedded.map(|e| e.domain.clone()))
            .unwrap_or_default();
        let primary_type = options
            .primary_type
            .or_else(|| embedded.map(|e| e.primary_type.clone()))
            .unwrap_or_else(|| ROOT_TYPE.to_string());
        let source = options
            .types
            .or_else(|| embedded.map(|e| e.message_schema.clone()));
        let types = match source {
            Some(source) => resolve_schema(source, options.document_loader).await?,
            None => {
                tracing::debug!("no schema supplied or embedded, deriving from document");
                derive_types(document)?
            }
        };

        let unsigned = proof.without_proof_value();
        let verify_data =
            self.create_verify_data(document, &unsigned, domain, types, &primary_type)?;
        tracing::debug!(
            proof_digest = %hex::encode(verify_data.proof_digest()),
            envelope_digest = %hex::encode(verify_data.envelope_digest()),
            "rebuilt verify data"
        );
        let recovered =
            self.verify_signature(&verify_data.typed_data, signature, verification_method)?;

        options.purpose.matches(&unsigned, document)?;
        Ok(recovered)
    }

    /// Assemble the typed-data envelope for `document` and canonicalize it
    /// together with `proof` (minus `proofValue` and `eip712Domain`).
    pub fn create_verify_data(
        &self,
        document: &Value,
        proof: &Proof,
        domain: Eip712Domain,
        types: TypeSchema,
        primary_type: &str,
    ) -> Result<VerifyData, SuiteError> {
        // The embedded signing context is attached after signing, so it is
        // excluded along with the signature.
        let context_free = Proof {
            eip712_domain: None,
            ..proof.clone()
        };
        let canonical_proof = CanonicalBytes::without_field(&context_free, PROOF_VALUE_KEY)?;
        let typed_data = TypedData::new(domain, types, primary_type, document.clone());
        let canonical_envelope = CanonicalBytes::new(&typed_data)?;
        Ok(VerifyData {
            typed_data,
            canonical_proof,
            canonical_envelope,
        })
    }

    /// Sign `verify_data` and store the signature as `proofValue`.
    ///
    /// # Errors
    ///
    /// [`SuiteError::MissingSigner`] when the suite has no signer.
    pub async fn sign(&self, verify_data: &VerifyData, mut proof: Proof) -> Result<Proof, SuiteError> {
        let signer = self.signer.as_ref().ok_or(SuiteError::MissingSigner)?;
        let signature = signer.sign_typed_data(&verify_data.typed_data).await?;
        proof.proof_value = Some(signature);
        Ok(proof)
    }

    /// Recover the signer of `typed_data` and compare it with the bare
    /// address of `verification_method`. Returns the recovered address.
    ///
    /// # Errors
    ///
    /// [`SuiteError::SignatureMismatch`] when the addresses differ.
    pub fn verify_signature(
        &self,
        typed_data: &TypedData,
        signature: &str,
        verification_method: &str,
    ) -> Result<String, SuiteError> {
        let expected = VerificationMethodId::new(verification_method)?;
        let recovered = self.verifier.recover_address(typed_data, signature)?;
        tracing::debug!(recovered = %recovered, expected = expected.bare_address(), "recovered signer");

        if addresses_match(&recovered, expected.bare_address()) {
            Ok(recovered)
        } else {
            Err(SuiteError::SignatureMismatch {
                expected: expected.bare_address().to_string(),
                recovered,
            })
        }
    }
}

async fn resolve_schema(
    source: SchemaSource,
    loader: Option<&dyn DocumentLoader>,
) -> Result<TypeSchema, SuiteError> {
    match source {
        SchemaSource::Inline(schema) => Ok(schema),
        SchemaSource::Remote(uri) => {
            let loader = loader.ok_or_else(|| SuiteError::MissingDocumentLoader(uri.clone()))?;
            let remote = loader.load(&uri).await?;
            tracing::debug!(uri = %uri, document_url = %remote.document_url, "resolved remote schema");
            Ok(serde_json::from_value(remote.document)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::StaticDocumentLoader;
    use crate::purpose::{AssertionMethodPurpose, AuthenticationPurpose};
    use ethsig_crypto::LocalWallet;
    use serde_json::json;

    fn wallet() -> Arc<LocalWallet> {
        Arc::new(LocalWallet::from_hex("0xc85ef7d79691fe79573b1a7064c19c1a9819ebdbd1faaab1a8ec92344438aaf4").unwrap())
    }

    fn suite_for(wallet: Arc<LocalWallet>) -> Eip712Signature2021 {
        let vm = format!("did:pkh:eip155:1:{}#blockchainAccountId", wallet.address());
        Eip712Signature2021::new(SuiteOptions {
            signer: Some(wallet),
            verification_method: Some(vm),
            date: None,
        })
        .unwrap()
    }

    fn document() -> Value {
        json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential"],
            "issuer": "did:example:issuer",
            "issuanceDate": "2021-01-01T00:00:00Z",
            "credentialSubject": {
                "id": "did:example:subject",
                "degree": {"type": "BachelorDegree", "name": "Bachelor of Science"}
            }
        })
    }

    #[tokio::test]
    async fn create_then_verify() {
        let suite = suite_for(wallet());
        let doc = document();
        let proof = suite
            .create_proof(&doc, CreateProofOptions::new(&AssertionMethodPurpose))
            .await
            .unwrap();

        assert_eq!(proof.proof_type, PROOF_TYPE);
        assert_eq!(proof.proof_purpose.as_deref(), Some("assertionMethod"));
        assert!(proof.proof_value.as_deref().unwrap().starts_with("0x"));
        let embedded = proof.eip712_domain.as_ref().unwrap();
        assert_eq!(embedded.primary_type, ROOT_TYPE);

        let result = suite
            .verify_proof(&proof, &doc, VerifyProofOptions::new(&AssertionMethodPurpose))
            .await;
        assert!(result.verified, "{:?}", result.error);
        assert_eq!(
            result.recovered_address.as_deref(),
            Some("0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826")
        );
        assert!(result.into_result().is_ok());
    }

    #[tokio::test]
    async fn created_timestamp_has_second_precision() {
        let suite = suite_for(wallet());
        let proof = suite
            .create_proof(
                &document(),
                CreateProofOptions::new(&AssertionMethodPurpose)
                    .date(DateInput::EpochMillis(1_630_330_082_123)),
            )
            .await
            .unwrap();
        assert_eq!(proof.created.as_deref(), Some("2021-08-30T13:28:02Z"));
    }

    #[tokio::test]
    async fn suite_date_is_used_when_options_have_none() {
        let wallet = wallet();
        let suite = Eip712Signature2021::new(SuiteOptions {
            signer: Some(wallet.clone()),
            verification_method: Some(format!("{}#controller", wallet.address())),
            date: Some(DateInput::Text("2020-02-02T02:02:02.999Z".into())),
        })
        .unwrap();
        let proof = suite
            .create_proof(&document(), CreateProofOptions::new(&AssertionMethodPurpose))
            .await
            .unwrap();
        assert_eq!(proof.created.as_deref(), Some("2020-02-02T02:02:02Z"));
    }

    #[tokio::test]
    async fn no_embed_then_verify_by_rederivation() {
        let suite = suite_for(wallet());
        let doc = document();
        let proof = suite
            .create_proof(&doc, CreateProofOptions::new(&AssertionMethodPurpose).embed(false))
            .await
            .unwrap();
        assert!(proof.eip712_domain.is_none());

        let result = suite
            .verify_proof(&proof, &doc, VerifyProofOptions::new(&AssertionMethodPurpose))
            .await;
        assert!(result.verified, "{:?}", result.error);
    }

    #[tokio::test]
    async fn domain_must_match_when_not_embedded() {
        let suite = suite_for(wallet());
        let doc = document();
        let domain = Eip712Domain {
            name: Some("Test".into()),
            chain_id: Some(1),
            ..Eip712Domain::default()
        };
        let proof = suite
            .create_proof(
                &doc,
                CreateProofOptions::new(&AssertionMethodPurpose)
                    .domain(domain.clone())
                    .embed(false),
            )
            .await
            .unwrap();

        let without = suite
            .verify_proof(&proof, &doc, VerifyProofOptions::new(&AssertionMethodPurpose))
            .await;
        assert!(!without.verified);
        assert!(matches!(without.error, Some(SuiteError::SignatureMismatch { .. })));

        let with = suite
            .verify_proof(
                &proof,
                &doc,
                VerifyProofOptions::new(&AssertionMethodPurpose).domain(domain),
            )
            .await;
        assert!(with.verified, "{:?}", with.error);
    }

    #[tokio::test]
    async fn tampered_signature_fails() {
        let suite = suite_for(wallet());
        let doc = document();
        let mut proof = suite
            .create_proof(&doc, CreateProofOptions::new(&AssertionMethodPurpose))
            .await
            .unwrap();
        let sig = proof.proof_value.take().unwrap();
        let flipped = if &sig[10..11] == "a" { "b" } else { "a" };
        proof.proof_value = Some(format!("{}{}{}", &sig[..10], flipped, &sig[11..]));

        let result = suite
            .verify_proof(&proof, &doc, VerifyProofOptions::new(&AssertionMethodPurpose))
            .await;
        assert!(!result.verified);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn modified_document_fails() {
        let suite = suite_for(wallet());
        let doc = document();
        let proof = suite
            .create_proof(&doc, CreateProofOptions::new(&AssertionMethodPurpose))
            .await
            .unwrap();

        let mut changed = doc.clone();
        changed["issuer"] = json!("did:example:mallory");
        let result = suite
            .verify_proof(&proof, &changed, VerifyProofOptions::new(&AssertionMethodPurpose))
            .await;
        assert!(!result.verified);

        let mut extended = doc.clone();
        extended["extra"] = json!("field");
        let result = suite
            .verify_proof(&proof, &extended, VerifyProofOptions::new(&AssertionMethodPurpose))
            .await;
        assert!(!result.verified);
        assert!(matches!(result.error, Some(SuiteError::Crypto(_))));
    }

    #[tokio::test]
    async fn missing_signer_aborts_creation() {
        let suite = Eip712Signature2021::new(SuiteOptions::default()).unwrap();
        let err = suite
            .create_proof(&document(), CreateProofOptions::new(&AssertionMethodPurpose))
            .await
            .unwrap_err();
        assert!(matches!(err, SuiteError::MissingSigner));
    }

    #[tokio::test]
    async fn schema_errors_abort_creation() {
        let suite = suite_for(wallet());
        let err = suite
            .create_proof(
                &json!({"x": ["a", 1, true]}),
                CreateProofOptions::new(&AssertionMethodPurpose),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SuiteError::Schema(_)));
    }

    #[test]
    fn constructor_rejects_malformed_verification_method() {
        let err = Eip712Signature2021::new(SuiteOptions {
            verification_method: Some("not a uri".into()),
            ..SuiteOptions::default()
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: \"verificationMethod\" must be a URI string"
        );
    }

    #[tokio::test]
    async fn missing_members_fail_verification() {
        let suite = suite_for(wallet());
        let doc = document();
        let proof = suite
            .create_proof(&doc, CreateProofOptions::new(&AssertionMethodPurpose))
            .await
            .unwrap();
        let purpose = AssertionMethodPurpose;

        let mut no_vm = proof.clone();
        no_vm.verification_method = None;
        let result = suite.verify_proof(&no_vm, &doc, VerifyProofOptions::new(&purpose)).await;
        assert!(matches!(result.error, Some(SuiteError::MissingVerificationMethod)));

        let mut no_value = proof.clone();
        no_value.proof_value = None;
        let result = suite.verify_proof(&no_value, &doc, VerifyProofOptions::new(&purpose)).await;
        assert!(matches!(result.error, Some(SuiteError::MissingProofValue)));

        let mut other_type = proof.clone();
        other_type.proof_type = "Ed25519Signature2020".into();
        let result = suite.verify_proof(&other_type, &doc, VerifyProofOptions::new(&purpose)).await;
        assert!(matches!(result.error, Some(SuiteError::UnsupportedProofType(_))));
    }

    #[tokio::test]
    async fn purpose_mismatch_fails_verification() {
        let suite = suite_for(wallet());
        let doc = document();
        let proof = suite
            .create_proof(&doc, CreateProofOptions::new(&AuthenticationPurpose::new("abc")))
            .await
            .unwrap();

        let ok = suite
            .verify_proof(&proof, &doc, VerifyProofOptions::new(&AuthenticationPurpose::new("abc")))
            .await;
        assert!(ok.verified, "{:?}", ok.error);

        let wrong = suite
            .verify_proof(&proof, &doc, VerifyProofOptions::new(&AuthenticationPurpose::new("xyz")))
            .await;
        assert!(matches!(wrong.error, Some(SuiteError::PurposeMismatch(_))));

        let assertion = suite
            .verify_proof(&proof, &doc, VerifyProofOptions::new(&AssertionMethodPurpose))
            .await;
        assert!(matches!(assertion.error, Some(SuiteError::PurposeMismatch(_))));
    }

    #[tokio::test]
    async fn wrong_verification_method_fails() {
        let suite = suite_for(wallet());
        let doc = document();
        let mut proof = suite
            .create_proof(&doc, CreateProofOptions::new(&AssertionMethodPurpose))
            .await
            .unwrap();
        proof.verification_method = Some(VerificationMethod::Id(
            "did:example:0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD827#controller".into(),
        ));
        let result = suite
            .verify_proof(&proof, &doc, VerifyProofOptions::new(&AssertionMethodPurpose))
            .await;
        assert!(!result.verified);
        assert_eq!(
            result.recovered_address.as_deref(),
            Some("0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826")
        );
    }

    #[tokio::test]
    async fn remote_schema_resolved_through_loader() {
        let suite = suite_for(wallet());
        let doc = document();
        let mut proof = suite
            .create_proof(&doc, CreateProofOptions::new(&AssertionMethodPurpose))
            .await
            .unwrap();

        let uri = "https://example.com/schemas/credential.json";
        let embedded = proof.eip712_domain.as_mut().unwrap();
        let schema = match std::mem::replace(&mut embedded.message_schema, SchemaSource::Remote(uri.into())) {
            SchemaSource::Inline(schema) => schema,
            SchemaSource::Remote(_) => unreachable!(),
        };

        let no_loader = suite
            .verify_proof(&proof, &doc, VerifyProofOptions::new(&AssertionMethodPurpose))
            .await;
        assert!(matches!(no_loader.error, Some(SuiteError::MissingDocumentLoader(_))));

        let empty = StaticDocumentLoader::new();
        let unknown = suite
            .verify_proof(
                &proof,
                &doc,
                VerifyProofOptions::new(&AssertionMethodPurpose).document_loader(&empty),
            )
            .await;
        assert!(matches!(unknown.error, Some(SuiteError::Loader(_))));

        let loader = StaticDocumentLoader::new()
            .with_document(uri, serde_json::to_value(&schema).unwrap());
        let resolved = suite
            .verify_proof(
                &proof,
                &doc,
                VerifyProofOptions::new(&AssertionMethodPurpose).document_loader(&loader),
            )
            .await;
        assert!(resolved.verified, "{:?}", resolved.error);
    }

    #[tokio::test]
    async fn caller_types_and_primary_type() {
        let suite = suite_for(wallet());
        let doc = json!({"from": {"name": "Cow"}, "contents": "Hello"});
        let types: TypeSchema = serde_json::from_value(json!({
            "Person": [{"name": "name", "type": "string"}],
            "Mail": [
                {"name": "from", "type": "Person"},
                {"name": "contents", "type": "string"}
            ]
        }))
        .unwrap();

        let proof = suite
            .create_proof(
                &doc,
                CreateProofOptions::new(&AssertionMethodPurpose)
                    .types(types.clone(), "Mail")
                    .embed(false),
            )
            .await
            .unwrap();

        let result = suite
            .verify_proof(
                &proof,
                &doc,
                VerifyProofOptions::new(&AssertionMethodPurpose)
                    .types(types)
                    .primary_type("Mail"),
            )
            .await;
        assert!(result.verified, "{:?}", result.error);
    }

    #[tokio::test]
    async fn low_level_sign_and_verify_signature() {
        let wallet = wallet();
        let vm = format!("{}#controller", wallet.address());
        let suite = suite_for(wallet);
        let typed: TypedData = serde_json::from_value(json!({
            "domain": {
                "name": "Ether Mail",
                "version": "1",
                "chainId": 1,
                "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
            },
            "types": {
                "Person": [
                    {"name": "name", "type": "string"},
                    {"name": "wallet", "type": "address"}
                ],
                "Mail": [
                    {"name": "from", "type": "Person"},
                    {"name": "to", "type": "Person"},
                    {"name": "contents", "type": "string"}
                ]
            },
            "primaryType": "Mail",
            "message": {
                "from": {"name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"},
                "to": {"name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"},
                "contents": "Hello, Bob!"
            }
        }))
        .unwrap();

        let verify_data = suite
            .create_verify_data(
                &typed.message,
                &Proof::new(PROOF_TYPE),
                typed.domain.clone(),
                typed.types.clone(),
                &typed.primary_type,
            )
            .unwrap();
        let signed = suite.sign(&verify_data, Proof::new(PROOF_TYPE)).await.unwrap();
        let signature = signed.proof_value.unwrap();

        let recovered = suite
            .verify_signature(&verify_data.typed_data, &signature, &vm)
            .unwrap();
        assert_eq!(recovered, "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826");
        assert!(suite
            .verify_signature(&verify_data.typed_data, &signature, &vm.to_lowercase())
            .is_ok());
        assert!(suite
            .verify_signature(
                &verify_data.typed_data,
                &signature,
                "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB#controller"
            )
            .is_err());
    }

    #[test]
    fn canonical_proof_excludes_signature() {
        let suite = suite_for(wallet());
        let mut proof = Proof::new(PROOF_TYPE);
        proof.created = Some("2021-01-01T00:00:00Z".into());
        let unsigned = suite
            .create_verify_data(&json!({}), &proof, Eip712Domain::default(), TypeSchema::new(), ROOT_TYPE)
            .unwrap();
        proof.proof_value = Some("0xabc".into());
        let signed = suite
            .create_verify_data(&json!({}), &proof, Eip712Domain::default(), TypeSchema::new(), ROOT_TYPE)
            .unwrap();
        assert_eq!(unsigned.canonical_proof, signed.canonical_proof);
        assert_eq!(unsigned.proof_digest(), signed.proof_digest());
        assert_eq!(
            unsigned.canonical_proof.as_str(),
            r#"{"created":"2021-01-01T00:00:00Z","type":"EthereumEip712Signature2021"}"#
        );
    }

    #[tokio::test]
    async fn proof_digest_matches_between_create_and_verify() {
        let suite = suite_for(wallet());
        let doc = document();
        let domain: Eip712Domain = serde_json::from_value(json!({"name": "Test", "chainId": 1})).unwrap();
        let options = || {
            CreateProofOptions::new(&AssertionMethodPurpose)
                .domain(domain.clone())
                .date(DateInput::Text("2021-08-30T13:28:02Z".into()))
        };

        // Signatures are deterministic for a fixed key, so the only
        // difference between the two proofs is the embedded context.
        let bare = suite.create_proof(&doc, options().embed(false)).await.unwrap();
        let embedded = suite.create_proof(&doc, options()).await.unwrap();
        assert!(bare.eip712_domain.is_none());
        assert!(embedded.eip712_domain.is_some());

        let types = derive_types(&doc).unwrap();
        let create_side = suite
            .create_verify_data(&doc, &bare.without_proof_value(), domain.clone(), types.clone(), ROOT_TYPE)
            .unwrap();
        let verify_side = suite
            .create_verify_data(&doc, &embedded.without_proof_value(), domain, types, ROOT_TYPE)
            .unwrap();

        assert_eq!(create_side.canonical_proof, verify_side.canonical_proof);
        assert_eq!(create_side.proof_digest(), verify_side.proof_digest());
        assert_eq!(create_side.envelope_digest(), verify_side.envelope_digest());
        assert!(!verify_side.canonical_proof.as_str().contains("eip712Domain"));
    }
}
