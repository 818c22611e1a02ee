//! Proxy configuration.
//!
//! Configuration only affects diagnostics; interception semantics are the
//! same with every setting. Files may be TOML or JSON:
//!
//! ```toml
//! trace-values = true
//! warn-on-suppressed = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ProxyError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProxyConfig {
    /// Render arguments and results into trace events.
    /// Off by default since they may carry sensitive data.
    pub trace_values: bool,

    /// Log target failures that an interceptor suppressed at `warn`
    /// rather than `debug`.
    pub warn_on_suppressed: bool,
}

impl ProxyConfig {
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| ProxyError::Config(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> crate::Result<Self> {
        serde_json::from_str(content).map_err(|e| ProxyError::Config(e.to_string()))
    }

    /// Load from a file; `.json` files are parsed as JSON, everything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read proxy config from {}", path.display()))?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
        .with_context(|| format!("Failed to parse proxy config from {}", path.display()))?;
        tracing::debug!(?config, path = %path.display(), "loaded proxy config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use indoc::indoc;

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(ProxyConfig::from_toml_str("").unwrap(), ProxyConfig::default());
        assert_eq!(ProxyConfig::from_json_str("{}").unwrap(), ProxyConfig::default());
    }

    #[test]
    fn parses_toml() {
        let config = ProxyConfig::from_toml_str(indoc! {r#"
            trace-values = true
        "#})
        .unwrap();
        assert_eq!(
            config,
            ProxyConfig {
                trace_values: true,
                warn_on_suppressed: false,
            }
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = ProxyConfig::from_toml_str(indoc! {r#"
            trace-values = true
            retry = 3
        "#})
        .unwrap_err();
        assert_matches!(err, ProxyError::Config(message) if message.contains("retry"));
    }

    #[test]
    fn load_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json = dir.path().join("proxy.json");
        std::fs::write(&json, r#"{ "warn-on-suppressed": true }"#).unwrap();
        assert!(ProxyConfig::load(&json).unwrap().warn_on_suppressed);

        let toml = dir.path().join("proxy.toml");
        std::fs::write(&toml, "trace-values = true\nwarn-on-suppressed = true\n").unwrap();
        assert_eq!(
            ProxyConfig::load(&toml).unwrap(),
            ProxyConfig {
                trace_values: true,
                warn_on_suppressed: true,
            }
        );
    }

    #[test]
    fn load_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let err = ProxyConfig::load(&missing).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read proxy config from"));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "trace-values = true").unwrap();
        let err = ProxyConfig::load(&bad).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse proxy config from"));
        assert_matches!(err.downcast_ref::<ProxyError>(), Some(ProxyError::Config(_)));
    }
}
