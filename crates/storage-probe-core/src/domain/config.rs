//! Config - 実行設定（起動時に 1 回だけ構築）
//!
//! 環境変数から `ProbeConfig` を組み立てます。構築後は不変で、
//! `HealthCheckBuilder` に値として渡します（グローバル状態は持たない）。
//!
//! # 環境変数
//! - `ENDPOINT_URL`（必須、別名 `SUPABASE_URL`）
//! - `ACCESS_CREDENTIAL`（必須、別名 `SUPABASE_ANON_KEY`）
//! - `NAMESPACE_CODE`（任意、別名 `EVENT_CODE`）
//! - `STORAGE_BUCKET` / `PROBE_SCRATCH_DIR` / `PROBE_TIMEOUT_SECS`（任意）

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use super::errors::ConfigError;

pub const ENDPOINT_VARS: &[&str] = &["ENDPOINT_URL", "SUPABASE_URL"];
pub const CREDENTIAL_VARS: &[&str] = &["ACCESS_CREDENTIAL", "SUPABASE_ANON_KEY"];
pub const NAMESPACE_VARS: &[&str] = &["NAMESPACE_CODE", "EVENT_CODE"];
pub const BUCKET_VAR: &str = "STORAGE_BUCKET";
pub const SCRATCH_DIR_VAR: &str = "PROBE_SCRATCH_DIR";
pub const TIMEOUT_VAR: &str = "PROBE_TIMEOUT_SECS";

pub const DEFAULT_BUCKET: &str = "media";
pub const DEFAULT_SCRATCH_DIR: &str = "./tmp";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Opaque access credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value, for building request headers only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Folder-like prefix under which the fixture is stored and listed.
///
/// Leading/trailing slashes and whitespace are stripped, so `"/EVT42/"`
/// and `"EVT42"` are the same namespace. An empty namespace means the
/// bucket root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().trim_matches('/').to_string())
    }

    pub fn root() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Path segments (nested namespaces such as `a/b` yield two).
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How to treat a missing namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamespacePolicy {
    /// Store at the bucket root and list the root.
    #[default]
    AllowEmpty,
    /// Missing namespace is a configuration error.
    Required,
}

/// Immutable settings for one health-check run.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub endpoint: Url,
    pub credential: Credential,
    pub namespace: Namespace,
    pub bucket: String,
    pub scratch_dir: PathBuf,
    pub request_timeout: Duration,
    /// Remove the local fixture after a fully successful run.
    pub cleanup_fixture: bool,
}

impl ProbeConfig {
    /// Minimal config with defaults for everything optional.
    pub fn new(endpoint: Url, credential: Credential, namespace: Namespace) -> Self {
        Self {
            endpoint,
            credential,
            namespace,
            bucket: DEFAULT_BUCKET.to_string(),
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cleanup_fixture: false,
        }
    }

    pub fn from_env(policy: NamespacePolicy) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), policy)
    }

    /// `lookup` で値を引いて設定を構築する。
    ///
    /// 空文字列は未設定と同じ扱い。endpoint → credential の順に検査するので、
    /// 両方欠けているときは endpoint 側のエラーになる。
    pub fn from_lookup<F>(lookup: F, policy: NamespacePolicy) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let first = |keys: &[&str]| keys.iter().find_map(|key| get(*key));

        let endpoint_raw = first(ENDPOINT_VARS).ok_or(ConfigError::Missing {
            var: ENDPOINT_VARS[0],
        })?;
        let credential = first(CREDENTIAL_VARS).ok_or(ConfigError::Missing {
            var: CREDENTIAL_VARS[0],
        })?;
        let endpoint = parse_endpoint(&endpoint_raw)?;

        let namespace = first(NAMESPACE_VARS)
            .map(|raw| Namespace::new(&raw))
            .unwrap_or_default();
        if namespace.is_empty() && policy == NamespacePolicy::Required {
            return Err(ConfigError::MissingNamespace {
                var: NAMESPACE_VARS[0],
            });
        }

        let mut config = Self::new(endpoint, Credential::new(credential.trim()), namespace);
        if let Some(bucket) = get(BUCKET_VAR) {
            config.bucket = bucket.trim().to_string();
        }
        if let Some(dir) = get(SCRATCH_DIR_VAR) {
            config.scratch_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get(TIMEOUT_VAR) {
            config.request_timeout = parse_timeout_secs(&raw)?;
        }
        Ok(config)
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup_fixture = cleanup;
        self
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let value = raw.trim();
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidEndpoint {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEndpoint {
            value: value.to_string(),
            reason: "expected an http(s) URL".to_string(),
        });
    }
    Ok(url)
}

fn parse_timeout_secs(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn loads_required_and_defaults() {
        let lookup = lookup_from(&[
            ("ENDPOINT_URL", "https://storage.example"),
            ("ACCESS_CREDENTIAL", "valid-key"),
            ("NAMESPACE_CODE", "EVT42"),
        ]);
        let config = ProbeConfig::from_lookup(lookup, NamespacePolicy::AllowEmpty).unwrap();

        assert_eq!(config.endpoint.as_str(), "https://storage.example/");
        assert_eq!(config.credential.expose(), "valid-key");
        assert_eq!(config.namespace.as_str(), "EVT42");
        assert_eq!(config.bucket, DEFAULT_BUCKET);
        assert_eq!(config.scratch_dir, PathBuf::from("./tmp"));
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(!config.cleanup_fixture);
    }

    #[rstest]
    #[case::nothing(&[], "ENDPOINT_URL")]
    #[case::no_credential(&[("ENDPOINT_URL", "https://storage.example")], "ACCESS_CREDENTIAL")]
    #[case::no_endpoint(&[("ACCESS_CREDENTIAL", "valid-key")], "ENDPOINT_URL")]
    #[case::blank_endpoint(&[("ENDPOINT_URL", "  "), ("ACCESS_CREDENTIAL", "k")], "ENDPOINT_URL")]
    fn missing_required_setting_is_rejected(
        #[case] pairs: &[(&str, &str)],
        #[case] expected_var: &str,
    ) {
        let err = ProbeConfig::from_lookup(lookup_from(pairs), NamespacePolicy::AllowEmpty)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing { var } if var == expected_var));
    }

    #[test]
    fn legacy_variable_names_are_accepted() {
        let lookup = lookup_from(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("EVENT_CODE", "EVT7"),
        ]);
        let config = ProbeConfig::from_lookup(lookup, NamespacePolicy::AllowEmpty).unwrap();
        assert_eq!(config.endpoint.host_str(), Some("abc.supabase.co"));
        assert_eq!(config.namespace.as_str(), "EVT7");
    }

    #[test]
    fn primary_names_win_over_aliases() {
        let lookup = lookup_from(&[
            ("ENDPOINT_URL", "https://primary.example"),
            ("SUPABASE_URL", "https://alias.example"),
            ("ACCESS_CREDENTIAL", "k"),
        ]);
        let config = ProbeConfig::from_lookup(lookup, NamespacePolicy::AllowEmpty).unwrap();
        assert_eq!(config.endpoint.host_str(), Some("primary.example"));
    }

    #[rstest]
    #[case::not_a_url("storage.example")]
    #[case::ftp("ftp://storage.example")]
    #[case::mailto("mailto:ops@storage.example")]
    fn invalid_endpoint_is_rejected(#[case] endpoint: &str) {
        let lookup = lookup_from(&[("ENDPOINT_URL", endpoint), ("ACCESS_CREDENTIAL", "k")]);
        let err = ProbeConfig::from_lookup(lookup, NamespacePolicy::AllowEmpty).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }

    #[test]
    fn absent_namespace_defaults_to_root() {
        let lookup = lookup_from(&[
            ("ENDPOINT_URL", "https://storage.example"),
            ("ACCESS_CREDENTIAL", "k"),
        ]);
        let config = ProbeConfig::from_lookup(lookup, NamespacePolicy::AllowEmpty).unwrap();
        assert!(config.namespace.is_empty());
    }

    #[test]
    fn absent_namespace_fails_when_required() {
        let lookup = lookup_from(&[
            ("ENDPOINT_URL", "https://storage.example"),
            ("ACCESS_CREDENTIAL", "k"),
        ]);
        let err = ProbeConfig::from_lookup(lookup, NamespacePolicy::Required).unwrap_err();
        assert!(matches!(err, ConfigError::MissingNamespace { .. }));
    }

    #[rstest]
    #[case("EVT42", "EVT42")]
    #[case("/EVT42/", "EVT42")]
    #[case(" events/EVT42 ", "events/EVT42")]
    #[case("///", "")]
    fn namespace_is_normalised(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(Namespace::new(raw).as_str(), expected);
    }

    #[test]
    fn optional_overrides_are_read() {
        let lookup = lookup_from(&[
            ("ENDPOINT_URL", "https://storage.example"),
            ("ACCESS_CREDENTIAL", "k"),
            ("STORAGE_BUCKET", "uploads"),
            ("PROBE_SCRATCH_DIR", "/var/tmp/probe"),
            ("PROBE_TIMEOUT_SECS", "5"),
        ]);
        let config = ProbeConfig::from_lookup(lookup, NamespacePolicy::AllowEmpty).unwrap();
        assert_eq!(config.bucket, "uploads");
        assert_eq!(config.scratch_dir, PathBuf::from("/var/tmp/probe"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[rstest]
    #[case::zero("0")]
    #[case::negative("-3")]
    #[case::words("soon")]
    fn invalid_timeout_is_rejected(#[case] raw: &str) {
        let lookup = lookup_from(&[
            ("ENDPOINT_URL", "https://storage.example"),
            ("ACCESS_CREDENTIAL", "k"),
            ("PROBE_TIMEOUT_SECS", raw),
        ]);
        let err = ProbeConfig::from_lookup(lookup, NamespacePolicy::AllowEmpty).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { .. }));
    }

    #[test]
    fn credential_debug_is_redacted() {
        let credential = Credential::new("super-secret");
        assert_eq!(format!("{credential:?}"), "Credential(***)");
    }
}
