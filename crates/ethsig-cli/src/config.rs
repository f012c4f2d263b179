//! # Suite Configuration
//!
//! Optional YAML file passed with `--config`:
//!
//! ```yaml
//! domain:
//!   name: Example Issuer
//!   version: "1"
//!   chainId: 1
//! embed: true
//! purpose:
//!   type: authentication
//!   challenge: 99612b24-63d9-11ea-b99f-4f66f3e4f81a
//!   domain: example.com
//! documents:
//!   https://example.com/schemas/credential-v1.json: schemas/credential-v1.json
//! ```
//!
//! `documents` maps schema URIs to local files, served to the verifier by a
//! [`StaticDocumentLoader`]. Files may be JSON or YAML.
//!
//! ## Environment
//!
//! - `ETHSIG_PRIVATE_KEY`: hex private key used by `sign` when `--key` is
//!   not given.
//! - `ETHSIG_CHAIN_ID`: overrides `domain.chainId`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use ethsig_crypto::Eip712Domain;
use ethsig_vc::{AssertionMethodPurpose, AuthenticationPurpose, ProofPurpose, StaticDocumentLoader};

/// Environment variable holding the signing key.
pub const PRIVATE_KEY_ENV: &str = "ETHSIG_PRIVATE_KEY";

/// Environment variable overriding the domain chain id.
pub const CHAIN_ID_ENV: &str = "ETHSIG_CHAIN_ID";

/// Settings shared by the `sign` and `verify` subcommands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SuiteConfig {
    /// EIP-712 domain used when signing, and when verifying a proof that
    /// embeds none.
    #[serde(default)]
    pub domain: Eip712Domain,

    /// Embed the signing context in created proofs.
    #[serde(default = "default_embed")]
    pub embed: bool,

    #[serde(default)]
    pub purpose: PurposeConfig,

    /// Schema URI → local file.
    #[serde(default)]
    pub documents: BTreeMap<String, PathBuf>,
}

fn default_embed() -> bool {
    true
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            domain: Eip712Domain::default(),
            embed: default_embed(),
            purpose: PurposeConfig::default(),
            documents: BTreeMap::new(),
        }
    }
}

/// Proof purpose selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PurposeConfig {
    #[default]
    AssertionMethod,
    Authentication {
        #[serde(default)]
        challenge: Option<String>,
        #[serde(default)]
        domain: Option<String>,
    },
}

impl PurposeConfig {
    /// Build the purpose used to stamp and check proofs.
    pub fn build(&self) -> Result<Box<dyn ProofPurpose>> {
        match self {
            PurposeConfig::AssertionMethod => Ok(Box::new(AssertionMethodPurpose)),
            PurposeConfig::Authentication { challenge, domain } => {
                let challenge = challenge
                    .as_deref()
                    .context("authentication purpose requires a challenge")?;
                let mut purpose = AuthenticationPurpose::new(challenge);
                if let Some(domain) = domain {
                    purpose = purpose.with_domain(domain.clone());
                }
                Ok(Box::new(purpose))
            }
        }
    }
}

impl SuiteConfig {
    /// Load the configuration file (or the defaults when `path` is `None`),
    /// apply environment overrides, and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        tracing::debug!(path = %path.display(), documents = config.documents.len(), "loaded config");
        Ok(config)
    }

    /// Apply overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup(CHAIN_ID_ENV) {
            let chain_id = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{CHAIN_ID_ENV} is not a chain id: {raw:?}"))?;
            tracing::debug!(chain_id, "chain id overridden from environment");
            self.domain.chain_id = Some(chain_id);
        }
        Ok(())
    }

    /// Reject an authentication purpose without a challenge and empty
    /// document paths.
    pub fn validate(&self) -> Result<()> {
        if let PurposeConfig::Authentication { challenge, .. } = &self.purpose {
            if challenge.as_deref().map_or(true, str::is_empty) {
                bail!("purpose \"authentication\" requires a non-empty challenge");
            }
        }
        for (uri, path) in &self.documents {
            if path.as_os_str().is_empty() {
                bail!("document {uri:?} has an empty path");
            }
        }
        Ok(())
    }

    /// Read every configured document into a loader. Relative paths resolve
    /// against `base_dir`.
    pub fn document_loader(&self, base_dir: &Path) -> Result<StaticDocumentLoader> {
        let mut loader = StaticDocumentLoader::new();
        for (uri, path) in &self.documents {
            let resolved = crate::resolve_path(path, base_dir);
            let content = std::fs::read_to_string(&resolved).with_context(|| {
                format!("failed to read document for {uri}: {}", resolved.display())
            })?;
            // YAML is a superset of JSON.
            let document: serde_json::Value = serde_yaml::from_str(&content)
                .with_context(|| format!("failed to parse document: {}", resolved.display()))?;
            loader.insert(uri.clone(), document);
        }
        Ok(loader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = SuiteConfig::default();
        assert!(config.embed);
        assert_eq!(config.purpose, PurposeConfig::AssertionMethod);
        assert!(config.domain.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_full_yaml() {
        let yaml = r#"
domain:
  name: Example Issuer
  version: "1"
  chainId: 5
embed: false
purpose:
  type: authentication
  challenge: abc
  domain: example.com
documents:
  https://example.com/schema: schema.json
"#;
        let config: SuiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.domain.name.as_deref(), Some("Example Issuer"));
        assert_eq!(config.domain.chain_id, Some(5));
        assert!(!config.embed);
        assert_eq!(
            config.purpose,
            PurposeConfig::Authentication {
                challenge: Some("abc".into()),
                domain: Some("example.com".into()),
            }
        );
        assert_eq!(
            config.documents["https://example.com/schema"],
            PathBuf::from("schema.json")
        );
        assert!(config.validate().is_ok());
        assert_eq!(config.purpose.build().unwrap().term(), "authentication");
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(serde_yaml::from_str::<SuiteConfig>("embeded: true\n").is_err());
    }

    #[test]
    fn authentication_without_challenge_is_invalid() {
        let config: SuiteConfig =
            serde_yaml::from_str("purpose:\n  type: authentication\n").unwrap();
        assert!(config.validate().is_err());
        assert!(config.purpose.build().is_err());
    }

    #[test]
    fn empty_document_path_is_invalid() {
        let mut config = SuiteConfig::default();
        config
            .documents
            .insert("https://example.com/schema".into(), PathBuf::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn chain_id_env_override() {
        let mut config = SuiteConfig::default();
        config
            .apply_env(|key| (key == CHAIN_ID_ENV).then(|| "137".to_string()))
            .unwrap();
        assert_eq!(config.domain.chain_id, Some(137));

        let mut config = SuiteConfig::default();
        assert!(config
            .apply_env(|key| (key == CHAIN_ID_ENV).then(|| "polygon".to_string()))
            .is_err());
    }

    #[test]
    fn document_loader_reads_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.json"),
            r#"{"Document":[{"name":"a","type":"string"}]}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("b.yaml"),
            "Document:\n  - name: b\n    type: bool\n",
        )
        .unwrap();

        let mut config = SuiteConfig::default();
        config.documents.insert("urn:a".into(), "a.json".into());
        config.documents.insert("urn:b".into(), "b.yaml".into());

        let loader = config.document_loader(dir.path()).unwrap();
        assert_eq!(loader.len(), 2);
    }

    #[test]
    fn document_loader_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SuiteConfig::default();
        config.documents.insert("urn:x".into(), "missing.json".into());
        assert!(config.document_loader(dir.path()).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ethsig.yaml");
        std::fs::write(&path, "embed: false\n").unwrap();
        let config = SuiteConfig::from_file(&path).unwrap();
        assert!(!config.embed);
    }
}
