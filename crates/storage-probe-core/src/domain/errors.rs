//! Errors - エラー型と分類
//!
//! どのエラーも終端（リトライなし・回復なし）。最初に失敗したステップで
//! 実行を打ち切り、非 0 で終了します。
//!
//! # 分類
//! - Configuration: 必須設定の欠落（ネットワークに触れる前）
//! - Filesystem: ローカルの一時ファイル/ディレクトリの作成失敗
//! - Upload: リモートが書き込みを拒否
//! - List: リモートが一覧取得を拒否
//! - Access: 公開 URL に到達できない、または非成功ステータス
//! - Unexpected: 上記以外

use std::path::PathBuf;

use thiserror::Error;

use super::step::CheckStep;
use crate::ports::{ProbeError, StoreError};

/// Problems found while building `ProbeConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {var}")]
    Missing { var: &'static str },

    #[error("namespace is required but {var} is not set")]
    MissingNamespace { var: &'static str },

    #[error("invalid endpoint {value:?}: {reason}")]
    InvalidEndpoint { value: String, reason: String },

    #[error("invalid request timeout {value:?}: expected whole seconds greater than zero")]
    InvalidTimeout { value: String },
}

/// Why the public-access probe did not pass.
#[derive(Debug, Error)]
pub enum AccessFailure {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error(transparent)]
    Unreachable(#[from] ProbeError),
}

/// CheckError は health check の失敗
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("upload to {path} failed: {source}")]
    Upload { path: String, source: StoreError },

    #[error("listing {prefix:?} failed: {source}")]
    List { prefix: String, source: StoreError },

    #[error("public access to {url} failed: {failure}")]
    Access { url: String, failure: AccessFailure },

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl CheckError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// The step this error aborted, if it belongs to one.
    pub const fn step(&self) -> Option<CheckStep> {
        match self {
            Self::Configuration(_) => Some(CheckStep::LoadConfiguration),
            Self::Filesystem { .. } => Some(CheckStep::PrepareFixture),
            Self::Upload { .. } => Some(CheckStep::UploadFixture),
            Self::List { .. } => Some(CheckStep::ListFolder),
            Self::Access { .. } => Some(CheckStep::ProbePublicAccess),
            Self::Unexpected(_) => None,
        }
    }

    /// Every failure is fatal and reported the same way to the shell.
    pub const fn exit_code(&self) -> u8 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn store_rejected() -> StoreError {
        StoreError::Rejected {
            status: 403,
            error: Some("Unauthorized".to_string()),
            message: "new row violates row-level security policy".to_string(),
        }
    }

    #[rstest]
    #[case::config(
        CheckError::from(ConfigError::Missing { var: "ENDPOINT_URL" }),
        Some(CheckStep::LoadConfiguration)
    )]
    #[case::fs(
        CheckError::filesystem("./tmp", std::io::Error::other("disk full")),
        Some(CheckStep::PrepareFixture)
    )]
    #[case::upload(
        CheckError::Upload { path: "EVT42/1-test.txt".into(), source: store_rejected() },
        Some(CheckStep::UploadFixture)
    )]
    #[case::list(
        CheckError::List { prefix: "EVT42".into(), source: store_rejected() },
        Some(CheckStep::ListFolder)
    )]
    #[case::access(
        CheckError::Access { url: "https://x".into(), failure: AccessFailure::Status(403) },
        Some(CheckStep::ProbePublicAccess)
    )]
    #[case::unexpected(CheckError::Unexpected("boom".into()), None)]
    fn errors_map_to_steps_and_exit_one(
        #[case] err: CheckError,
        #[case] expected: Option<CheckStep>,
    ) {
        assert_eq!(err.step(), expected);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn messages_carry_provider_detail() {
        let err = CheckError::Upload {
            path: "EVT42/1-test.txt".to_string(),
            source: store_rejected(),
        };
        let msg = err.to_string();
        assert!(msg.contains("EVT42/1-test.txt"));
        assert!(msg.contains("row-level security"));

        let err = CheckError::Access {
            url: "https://storage.example/x".to_string(),
            failure: AccessFailure::Status(403),
        };
        assert!(err.to_string().ends_with("HTTP status 403"));
    }
}
