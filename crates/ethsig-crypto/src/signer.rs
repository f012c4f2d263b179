//! # Typed-Data Signing and Signer Recovery
//!
//! Abstracts the signing key behind [`TypedDataSigner`] so the proof engine
//! never touches key material. Verification needs no key at all: the signer
//! address is recovered from the signature by [`TypedDataVerifier`].
//!
//! - [`LocalWallet`]: in-memory secp256k1 key for development, tests and
//!   the CLI. Key material is zeroized on drop.
//! - [`Eip712Recovery`]: stateless address recovery.
//!
//! ## Signature Wire Form
//!
//! `0x` followed by 65 bytes `r ‖ s ‖ v`, hex encoded, with `v ∈ {27, 28}`.
//! Recovery also accepts `v ∈ {0, 1}`.

use alloy_primitives::Address;
use async_trait::async_trait;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use zeroize::Zeroizing;

use crate::eip712::TypedData;
use crate::error::CryptoError;
use crate::keccak::keccak256;

/// Length of an `r ‖ s ‖ v` signature.
pub const SIGNATURE_LEN: usize = 65;

/// Signs typed data with a managed key.
///
/// Implementations must be `Send + Sync`: one signer is shared across
/// concurrent proof-creation calls.
#[async_trait]
pub trait TypedDataSigner: Send + Sync {
    /// EIP-55 checksummed address of the signing key.
    fn address(&self) -> String;

    /// Sign the EIP-712 digest of `typed_data`, returning the hex wire form.
    async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<String, CryptoError>;
}

/// Recovers the address that produced a typed-data signature.
pub trait TypedDataVerifier: Send + Sync {
    /// EIP-55 checksummed address of the signer.
    fn recover_address(&self, typed_data: &TypedData, signature: &str)
        -> Result<String, CryptoError>;
}

// ─── LocalWallet ─────────────────────────────────────────────────────────

/// In-memory secp256k1 signing key.
pub struct LocalWallet {
    key: SigningKey,
    address: Address,
}

impl LocalWallet {
    /// Generate a new random key using the OS CSPRNG.
    pub fn random() -> Self {
        Self::from_signing_key(SigningKey::random(&mut rand_core::OsRng))
    }

    /// Load a 32-byte private key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key = SigningKey::from_slice(bytes).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self::from_signing_key(key))
    }

    /// Load a hex private key, with or without `0x`. Surrounding whitespace
    /// is ignored.
    pub fn from_hex(private_key: &str) -> Result<Self, CryptoError> {
        let trimmed = private_key.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = Zeroizing::new(hex::decode(digits)?);
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKey(format!(
                "expected 32 bytes (64 hex chars), got {} bytes",
                bytes.len()
            )));
        }
        Self::from_bytes(&bytes)
    }

    fn from_signing_key(key: SigningKey) -> Self {
        let address = address_of(key.verifying_key());
        Self { key, address }
    }

    /// `0x`-prefixed hex private key.
    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("0x{}", hex::encode(self.key.to_bytes())))
    }

    /// Sign a 32-byte digest.
    pub fn sign_hash(&self, digest: &[u8; 32]) -> Result<String, CryptoError> {
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(digest)
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

        let mut wire = [0u8; SIGNATURE_LEN];
        wire[..64].copy_from_slice(&signature.to_bytes());
        wire[64] = 27 + recovery_id.to_byte();
        Ok(format!("0x{}", hex::encode(wire)))
    }
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.address.to_checksum(None))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TypedDataSigner for LocalWallet {
    fn address(&self) -> String {
        self.address.to_checksum(None)
    }

    async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<String, CryptoError> {
        let digest = typed_data.signing_hash()?;
        tracing::debug!(
            signer = %self.address,
            primary_type = %typed_data.primary_type,
            "signing typed data"
        );
        self.sign_hash(&digest)
    }
}

// ─── Recovery ────────────────────────────────────────────────────────────

/// Stateless typed-data signer recovery.
#[derive(Debug, Clone, Copy, Default)]
pub struct Eip712Recovery;

impl TypedDataVerifier for Eip712Recovery {
    fn recover_address(
        &self,
        typed_data: &TypedData,
        signature: &str,
    ) -> Result<String, CryptoError> {
        let digest = typed_data.signing_hash()?;
        recover_hash(&digest, signature)
    }
}

/// Recover the checksummed signer address of a digest.
pub fn recover_hash(digest: &[u8; 32], signature: &str) -> Result<String, CryptoError> {
    let (signature, recovery_id) = parse_signature(signature)?;
    let key = VerifyingKey::recover_from_prehash(digest, &signature, recovery_id)
        .map_err(|e| CryptoError::Recovery(e.to_string()))?;
    Ok(address_of(&key).to_checksum(None))
}

/// Split the hex wire form into signature and recovery id.
pub fn parse_signature(signature: &str) -> Result<(Signature, RecoveryId), CryptoError> {
    let digits = signature
        .strip_prefix("0x")
        .ok_or_else(|| CryptoError::InvalidSignature("missing 0x prefix".into()))?;
    let bytes = hex::decode(digits)?;
    if bytes.len() != SIGNATURE_LEN {
        return Err(CryptoError::InvalidSignature(format!(
            "expected {SIGNATURE_LEN} bytes, got {}",
            bytes.len()
        )));
    }

    let v = match bytes[64] {
        27 | 28 => bytes[64] - 27,
        0 | 1 => bytes[64],
        other => {
            return Err(CryptoError::InvalidSignature(format!(
                "invalid recovery byte {other}"
            )))
        }
    };
    let recovery_id = RecoveryId::from_byte(v)
        .ok_or_else(|| CryptoError::InvalidSignature(format!("invalid recovery byte {v}")))?;
    let signature = Signature::from_slice(&bytes[..64])
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    Ok((signature, recovery_id))
}

/// `keccak256(uncompressed_pubkey[1..])[12..]`.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
