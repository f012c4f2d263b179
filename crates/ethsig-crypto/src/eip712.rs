//! # EIP-712 Structured-Data Hashing
//!
//! Implements the typed-data hashing rules:
//!
//! ```text
//! encodeType(T)   = T(type₁ name₁,…) ‖ referenced struct types sorted by name
//! typeHash(T)     = keccak256(encodeType(T))
//! encodeData(T,v) = typeHash(T) ‖ enc(v.name₁) ‖ enc(v.name₂) ‖ …
//! hashStruct(T,v) = keccak256(encodeData(T,v))
//! digest          = keccak256(0x19 ‖ 0x01 ‖ domainSeparator ‖ hashStruct(primary, message))
//! ```
//!
//! Member encoding (`enc`) produces one 32-byte word: `string` and `bytes` are
//! hashed; `bool`, `address`, `uint<N>`, `int<N>` are left-padded; `bytes<N>`
//! is right-padded; arrays hash the concatenation of their elements'
//! encodings; struct members are `hashStruct` of the nested value.
//!
//! ## Strictness
//!
//! A message object must carry exactly the fields its type declares. An
//! undeclared key is [`CryptoError::UnexpectedField`] and an absent key is
//! [`CryptoError::MissingField`]. A reused schema therefore cannot
//! silently drop content from the signed digest.

use std::borrow::Cow;
use std::collections::BTreeSet;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ethsig_schema::{FieldType, TypeSchema, TypedDataField};

use crate::error::CryptoError;
use crate::keccak::{keccak256, keccak256_concat};

/// Reserved name of the domain struct type.
pub const DOMAIN_TYPE: &str = "EIP712Domain";

// ─── Domain ──────────────────────────────────────────────────────────────

/// The application namespace a signature is bound to.
///
/// Every member is optional. The `EIP712Domain` struct type is built from
/// the members that are present, in the fixed order `name`, `version`,
/// `chainId`, `verifyingContract`, `salt`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Eip712Domain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Accepts a JSON number or a decimal / `0x` hex string.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "chain_id")]
    pub chain_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<Address>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<B256>,
}

impl Eip712Domain {
    /// The `EIP712Domain` field list for the members that are set.
    pub fn type_fields(&self) -> Vec<TypedDataField> {
        let mut fields = Vec::with_capacity(5);
        if self.name.is_some() {
            fields.push(TypedDataField::new("name", "string"));
        }
        if self.version.is_some() {
            fields.push(TypedDataField::new("version", "string"));
        }
        if self.chain_id.is_some() {
            fields.push(TypedDataField::new("chainId", "uint256"));
        }
        if self.verifying_contract.is_some() {
            fields.push(TypedDataField::new("verifyingContract", "address"));
        }
        if self.salt.is_some() {
            fields.push(TypedDataField::new("salt", "bytes32"));
        }
        fields
    }

    /// `hashStruct(EIP712Domain, self)`.
    pub fn separator(&self) -> [u8; 32] {
        let mut words: Vec<[u8; 32]> =
            vec![keccak256(render_type(DOMAIN_TYPE, &self.type_fields()))];
        if let Some(name) = &self.name {
            words.push(keccak256(name));
        }
        if let Some(version) = &self.version {
            words.push(keccak256(version));
        }
        if let Some(chain_id) = self.chain_id {
            words.push(U256::from(chain_id).to_be_bytes::<32>());
        }
        if let Some(contract) = &self.verifying_contract {
            words.push(contract.into_word().0);
        }
        if let Some(salt) = &self.salt {
            words.push(salt.0);
        }
        keccak256_concat(words.iter().map(|w| w.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.type_fields().is_empty()
    }
}

mod chain_id {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(id) => serializer.serialize_u64(*id),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        let repr = Option::<Repr>::deserialize(deserializer)?;
        repr.map(|repr| match repr {
            Repr::Number(id) => Ok(id),
            Repr::Text(text) => {
                let parsed = match text.strip_prefix("0x") {
                    Some(hex) => u64::from_str_radix(hex, 16),
                    None => text.parse(),
                };
                parsed.map_err(|e| de::Error::custom(format!("invalid chainId {text:?}: {e}")))
            }
        })
        .transpose()
    }
}

// ─── Typed-Data Envelope ─────────────────────────────────────────────────

/// `{domain, types, primaryType, message}`, the unit that is signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    #[serde(default)]
    pub domain: Eip712Domain,
    pub types: TypeSchema,
    pub primary_type: String,
    pub message: Value,
}

impl TypedData {
    /// Assemble an envelope. Any `EIP712Domain` entry in `types` is dropped;
    /// the domain type is always derived from `domain`.
    pub fn new(
        domain: Eip712Domain,
        mut types: TypeSchema,
        primary_type: impl Into<String>,
        message: Value,
    ) -> Self {
        types.remove(DOMAIN_TYPE);
        Self {
            domain,
            types,
            primary_type: primary_type.into(),
            message,
        }
    }

    pub fn domain_separator(&self) -> [u8; 32] {
        self.domain.separator()
    }

    /// `hashStruct(primaryType, message)`.
    pub fn struct_hash(&self) -> Result<[u8; 32], CryptoError> {
        hash_struct(&self.primary_type, &self.message, &self.message_types())
    }

    /// The 32-byte digest a signer signs.
    pub fn signing_hash(&self) -> Result<[u8; 32], CryptoError> {
        Ok(signing_hash(&self.domain_separator(), &self.struct_hash()?))
    }

    fn message_types(&self) -> Cow<'_, TypeSchema> {
        if self.types.contains(DOMAIN_TYPE) {
            let mut types = self.types.clone();
            types.remove(DOMAIN_TYPE);
            Cow::Owned(types)
        } else {
            Cow::Borrowed(&self.types)
        }
    }
}

// ─── Hashing ─────────────────────────────────────────────────────────────

/// `keccak256(0x19 ‖ 0x01 ‖ domain_separator ‖ struct_hash)`.
pub fn signing_hash(domain_separator: &[u8; 32], struct_hash: &[u8; 32]) -> [u8; 32] {
    keccak256_concat([
        [0x19u8, 0x01].as_slice(),
        domain_separator.as_slice(),
        struct_hash.as_slice(),
    ])
}

/// The `encodeType` string of `primary_type`.
pub fn encode_type(primary_type: &str, types: &TypeSchema) -> Result<String, CryptoError> {
    let primary_fields = types
        .get(primary_type)
        .ok_or_else(|| CryptoError::UnknownType(primary_type.to_string()))?;

    let mut deps = BTreeSet::new();
    collect_dependencies(primary_type, types, &mut deps)?;
    deps.remove(primary_type);

    let mut out = render_type(primary_type, primary_fields);
    for dep in &deps {
        let fields = types
            .get(dep)
            .ok_or_else(|| CryptoError::UnknownType(dep.clone()))?;
        out.push_str(&render_type(dep, fields));
    }
    Ok(out)
}

pub fn type_hash(primary_type: &str, types: &TypeSchema) -> Result<[u8; 32], CryptoError> {
    Ok(keccak256(encode_type(primary_type, types)?))
}

/// `typeHash ‖ enc(member₁) ‖ …` for a struct value.
pub fn encode_data(
    type_name: &str,
    value: &Value,
    types: &TypeSchema,
) -> Result<Vec<u8>, CryptoError> {
    let fields = types
        .get(type_name)
        .ok_or_else(|| CryptoError::UnknownType(type_name.to_string()))?;
    let Value::Object(object) = value else {
        return Err(invalid_value(type_name, value, "expected an object"));
    };

    if let Some(extra) = object
        .keys()
        .find(|key| !fields.iter().any(|f| &f.name == *key))
    {
        return Err(CryptoError::UnexpectedField {
            type_name: type_name.to_string(),
            field: extra.clone(),
        });
    }

    let mut out = Vec::with_capacity(32 * (fields.len() + 1));
    out.extend_from_slice(&type_hash(type_name, types)?);
    for field in fields {
        let member = object
            .get(&field.name)
            .ok_or_else(|| CryptoError::MissingField {
                type_name: type_name.to_string(),
                field: field.name.clone(),
            })?;
        let field_type = field.field_type()?;
        out.extend_from_slice(&encode_value(&field_type, member, types)?);
    }
    Ok(out)
}

/// `keccak256(encodeData(type_name, value))`.
pub fn hash_struct(
    type_name: &str,
    value: &Value,
    types: &TypeSchema,
) -> Result<[u8; 32], CryptoError> {
    Ok(keccak256(encode_data(type_name, value, types)?))
}

fn render_type(name: &str, fields: &[TypedDataField]) -> String {
    let members: Vec<String> = fields
        .iter()
        .map(|f| format!("{} {}", f.type_name, f.name))
        .collect();
    format!("{name}({})", members.join(","))
}

fn collect_dependencies(
    type_name: &str,
    types: &TypeSchema,
    found: &mut BTreeSet<String>,
) -> Result<(), CryptoError> {
    let fields = types
        .get(type_name)
        .ok_or_else(|| CryptoError::UnknownType(type_name.to_string()))?;
    for field in fields {
        let field_type = field.field_type()?;
        if let Some(dep) = field_type.struct_name() {
            if found.insert(dep.to_string()) {
                collect_dependencies(dep, types, found)?;
            }
        }
    }
    Ok(())
}

fn encode_value(
    field_type: &FieldType,
    value: &Value,
    types: &TypeSchema,
) -> Result<[u8; 32], CryptoError> {
    let type_name = field_type.to_string();
    match field_type {
        FieldType::Bool => match value {
            Value::Bool(b) => Ok(U256::from(u8::from(*b)).to_be_bytes::<32>()),
            _ => Err(invalid_value(&type_name, value, "expected a boolean")),
        },
        FieldType::String => match value {
            Value::String(s) => Ok(keccak256(s)),
            _ => Err(invalid_value(&type_name, value, "expected a string")),
        },
        FieldType::Bytes => Ok(keccak256(hex_value(&type_name, value)?)),
        FieldType::Address => {
            let text = value
                .as_str()
                .ok_or_else(|| invalid_value(&type_name, value, "expected a hex string"))?;
            let address: Address = text
                .parse()
                .map_err(|_| invalid_value(&type_name, value, "expected 20 hex bytes"))?;
            Ok(address.into_word().0)
        }
        FieldType::Uint(bits) => {
            let n = parse_unsigned(value)
                .ok_or_else(|| invalid_value(&type_name, value, "expected an unsigned integer"))?;
            if n.bit_len() > usize::from(*bits) {
                return Err(invalid_value(&type_name, value, "out of range"));
            }
            Ok(n.to_be_bytes::<32>())
        }
        FieldType::Int(bits) => {
            let (negative, magnitude) = parse_signed(value)
                .ok_or_else(|| invalid_value(&type_name, value, "expected an integer"))?;
            let limit = U256::from(1u8) << (usize::from(*bits) - 1);
            let in_range = if negative {
                magnitude <= limit
            } else {
                magnitude < limit
            };
            if !in_range {
                return Err(invalid_value(&type_name, value, "out of range"));
            }
            let word = if negative {
                U256::ZERO.wrapping_sub(magnitude)
            } else {
                magnitude
            };
            Ok(word.to_be_bytes::<32>())
        }
        FieldType::FixedBytes(len) => {
            let bytes = hex_value(&type_name, value)?;
            if bytes.len() > usize::from(*len) {
                return Err(invalid_value(&type_name, value, "too many bytes"));
            }
            let mut word = [0u8; 32];
            word[..bytes.len()].copy_from_slice(&bytes);
            Ok(word)
        }
        FieldType::Array(inner, fixed_len) => {
            let Value::Array(items) = value else {
                return Err(invalid_value(&type_name, value, "expected an array"));
            };
            if let Some(expected) = fixed_len {
                if items.len() != *expected {
                    return Err(invalid_value(
                        &type_name,
                        value,
                        &format!("expected {expected} elements, got {}", items.len()),
                    ));
                }
            }
            let mut encoded = Vec::with_capacity(32 * items.len());
            for item in items {
                encoded.extend_from_slice(&encode_value(inner, item, types)?);
            }
            Ok(keccak256(encoded))
        }
        FieldType::Struct(name) => hash_struct(name, value, types),
    }
}

fn parse_unsigned(value: &Value) -> Option<U256> {
    match value {
        Value::Number(n) => n.as_u64().map(U256::from),
        Value::String(s) => parse_unsigned_text(s),
        _ => None,
    }
}

fn parse_unsigned_text(text: &str) -> Option<U256> {
    let (digits, radix) = match text.strip_prefix("0x") {
        Some(hex) => (hex, 16),
        None => (text, 10),
    };
    if digits.is_empty() {
        return None;
    }
    U256::from_str_radix(digits, radix).ok()
}

fn parse_signed(value: &Value) -> Option<(bool, U256)> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some((i < 0, U256::from(i.unsigned_abs()))),
            None => n.as_u64().map(|u| (false, U256::from(u))),
        },
        Value::String(s) => match s.strip_prefix('-') {
            Some(rest) => parse_unsigned_text(rest).map(|m| (!m.is_zero(), m)),
            None => parse_unsigned_text(s).map(|m| (false, m)),
        },
        _ => None,
    }
}

fn hex_value(type_name: &str, value: &Value) -> Result<Vec<u8>, CryptoError> {
    let text = value
        .as_str()
        .ok_or_else(|| invalid_value(type_name, value, "expected a hex string"))?;
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| invalid_value(type_name, value, "missing 0x prefix"))?;
    hex::decode(digits).map_err(|e| invalid_value(type_name, value, &e.to_string()))
}

fn invalid_value(type_name: &str, value: &Value, reason: &str) -> CryptoError {
    CryptoError::InvalidValue {
        type_name: type_name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
