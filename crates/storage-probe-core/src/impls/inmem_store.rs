//! InMemoryObjectStore - 開発用・テスト用の ObjectStore
//!
//! # 学習ポイント
//! - tokio::sync::Mutex による async からの排他制御
//! - AtomicUsize で呼び出し回数を数える（短絡評価の検証用）
//! - 失敗の注入（reject_uploads / reject_lists）

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use url::Url;

use crate::domain::{ListingEntry, Namespace, RemoteObjectPath};
use crate::ports::object_store::join_segments;
use crate::ports::{
    Clock, ListOptions, ObjectStore, StoreError, StoredObject, SystemClock, UploadOptions,
};

#[derive(Debug, Clone)]
struct StoredEntry {
    bytes: Vec<u8>,
    content_type: String,
    created_at: DateTime<Utc>,
}

/// InMemoryObjectStore はプロセス内だけで完結するストア
///
/// # 実装詳細
/// - BTreeMap<String, StoredEntry> でパス順に保持
/// - list は prefix 直下の子だけを返す（サブフォルダはメタデータなしの 1 エントリ）
/// - upload は upsert=false なら既存パスで AlreadyExists
pub struct InMemoryObjectStore {
    public_base: Url,
    clock: Arc<dyn Clock>,
    objects: Mutex<BTreeMap<String, StoredEntry>>,
    upload_failure: Mutex<Option<String>>,
    list_failure: Mutex<Option<String>>,
    upload_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl InMemoryObjectStore {
    /// `public_base` に object path を連結したものが公開 URL になる
    pub fn new(public_base: Url) -> Self {
        Self::with_clock(public_base, Arc::new(SystemClock))
    }

    pub fn with_clock(public_base: Url, clock: Arc<dyn Clock>) -> Self {
        Self {
            public_base,
            clock,
            objects: Mutex::new(BTreeMap::new()),
            upload_failure: Mutex::new(None),
            list_failure: Mutex::new(None),
            upload_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// 以降の upload を 403 で拒否する
    pub async fn reject_uploads(&self, message: impl Into<String>) {
        *self.upload_failure.lock().await = Some(message.into());
    }

    /// 以降の list を 403 で拒否する
    pub async fn reject_lists(&self, message: impl Into<String>) {
        *self.list_failure.lock().await = Some(message.into());
    }

    /// Seed an object directly, bypassing counters and failure injection.
    pub async fn insert(&self, path: &str, bytes: &[u8], content_type: &str) {
        let entry = StoredEntry {
            bytes: bytes.to_vec(),
            content_type: content_type.to_string(),
            created_at: self.clock.now(),
        };
        self.objects.lock().await.insert(path.to_string(), entry);
    }

    pub async fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.lock().await.get(path).map(|e| e.bytes.clone())
    }

    pub async fn content_type(&self, path: &str) -> Option<String> {
        self.objects
            .lock()
            .await
            .get(path)
            .map(|e| e.content_type.clone())
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::Relaxed)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::Relaxed)
    }
}

fn forbidden(message: &str) -> StoreError {
    StoreError::Rejected {
        status: 403,
        error: Some("Unauthorized".to_string()),
        message: message.to_string(),
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload(
        &self,
        path: &RemoteObjectPath,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<StoredObject, StoreError> {
        self.upload_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(message) = self.upload_failure.lock().await.as_deref() {
            return Err(forbidden(message));
        }

        let key = path.to_string();
        let mut objects = self.objects.lock().await;
        if !options.upsert && objects.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key));
        }
        objects.insert(
            key.clone(),
            StoredEntry {
                bytes,
                content_type: options.content_type.clone(),
                created_at: self.clock.now(),
            },
        );
        Ok(StoredObject {
            path: key,
            key: None,
        })
    }

    async fn list(
        &self,
        prefix: &Namespace,
        options: &ListOptions,
    ) -> Result<Vec<ListingEntry>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(message) = self.list_failure.lock().await.as_deref() {
            return Err(forbidden(message));
        }

        let folder = if prefix.is_empty() {
            String::new()
        } else {
            format!("{prefix}/")
        };

        let objects = self.objects.lock().await;
        let mut children: BTreeMap<String, ListingEntry> = BTreeMap::new();
        for (key, entry) in objects.iter() {
            let Some(rest) = key.strip_prefix(folder.as_str()) else {
                continue;
            };
            match rest.split_once('/') {
                Some((sub, _)) => {
                    children
                        .entry(sub.to_string())
                        .or_insert_with(|| ListingEntry::folder(sub));
                }
                None => {
                    children.insert(
                        rest.to_string(),
                        ListingEntry::file(rest, entry.bytes.len() as u64, entry.created_at),
                    );
                }
            }
        }

        Ok(children
            .into_values()
            .skip(options.offset)
            .take(options.limit)
            .collect())
    }

    fn public_url(&self, path: &RemoteObjectPath) -> Url {
        join_segments(&self.public_base, path.segments())
    }
}
