//! ObjectStore port - リモートのオブジェクトストレージ
//!
//! ストレージの実体（認証・保存・URL 署名）は外部サービスに委譲します。
//! ここでは health check が消費する 3 操作だけを定義します。
//!
//! # 実装
//! - **SupabaseStorage**: REST API（本番用）
//! - **InMemoryObjectStore**: 開発用・テスト用

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::domain::{ListingEntry, Namespace, RemoteObjectPath};

/// Upper bound on entries requested per listing.
pub const DEFAULT_LIST_LIMIT: usize = 1000;

/// Options for a single upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: String,
    /// `false` = fail if an object already exists at the path.
    pub upsert: bool,
}

impl UploadOptions {
    pub fn no_overwrite(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            upsert: false,
        }
    }
}

/// Options for a listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub limit: usize,
    pub offset: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

/// What the store reports back after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Path inside the bucket.
    pub path: String,
    /// Provider-side key (usually `{bucket}/{path}`), when returned.
    pub key: Option<String>,
}

/// StoreError はリモートストアの拒否・通信エラー
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object already exists at {0}")]
    AlreadyExists(String),

    #[error("rejected with status {status}: {message}")]
    Rejected {
        status: u16,
        error: Option<String>,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// ObjectStore は health check が使うストレージ操作
///
/// # 契約
/// - `upload`: 成功時は格納パス、失敗時は構造化エラー
/// - `list`: `{name, size, createdAt}` の集合（順序はストア任せ）
/// - `public_url`: ネットワークを使わない同期計算。常に URL を返す
///
/// # Thread Safety
/// - `Send + Sync` を要求（`Arc<dyn ObjectStore>` で共有するため）
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        path: &RemoteObjectPath,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<StoredObject, StoreError>;

    async fn list(
        &self,
        prefix: &Namespace,
        options: &ListOptions,
    ) -> Result<Vec<ListingEntry>, StoreError>;

    fn public_url(&self, path: &RemoteObjectPath) -> Url;
}

/// Appends path segments to `base`, percent-encoding each one.
///
/// `base` must be a hierarchical URL; `ProbeConfig` only accepts http(s).
pub(crate) fn join_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty();
        path.extend(segments);
    }
    url
}
