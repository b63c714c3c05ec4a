//! SupabaseStorage - Supabase Storage REST API に対する ObjectStore
//!
//! # エンドポイント
//! - upload: `POST {endpoint}/storage/v1/object/{bucket}/{path}`
//! - list:   `POST {endpoint}/storage/v1/object/list/{bucket}`
//! - public: `{endpoint}/storage/v1/object/public/{bucket}/{path}`（ネットワーク不要）
//!
//! 認証は `Authorization: Bearer {key}` と `apikey: {key}` の両方を送ります。

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::describe_reqwest_error;
use crate::domain::{Credential, ListingEntry, Namespace, ProbeConfig, RemoteObjectPath};
use crate::ports::object_store::join_segments;
use crate::ports::{ListOptions, ObjectStore, StoreError, StoredObject, UploadOptions};

/// SupabaseStorage は 1 バケットに対する REST クライアント
pub struct SupabaseStorage {
    client: reqwest::Client,
    endpoint: Url,
    bucket: String,
    credential: Credential,
}

impl SupabaseStorage {
    /// `client` は probe と共有してよい（timeout は client 側で設定済み）
    pub fn new(client: reqwest::Client, config: &ProbeConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            bucket: config.bucket.clone(),
            credential: config.credential.clone(),
        }
    }

    fn object_url(&self, path: &RemoteObjectPath) -> Url {
        let base = ["storage", "v1", "object", self.bucket.as_str()];
        join_segments(&self.endpoint, base.into_iter().chain(path.segments()))
    }

    fn list_url(&self) -> Url {
        join_segments(
            &self.endpoint,
            ["storage", "v1", "object", "list", self.bucket.as_str()],
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.credential.expose())
            .header("apikey", self.credential.expose())
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key", default)]
    key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: usize,
    offset: usize,
    sort_by: SortBy,
}

#[derive(Debug, Serialize)]
struct SortBy {
    column: &'static str,
    order: &'static str,
}

#[derive(Debug, Deserialize)]
struct RawListEntry {
    name: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    metadata: Option<RawMetadata>,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    size: Option<u64>,
}

impl RawListEntry {
    fn into_entry(self) -> ListingEntry {
        ListingEntry {
            name: self.name,
            size_bytes: self.metadata.and_then(|m| m.size),
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

/// Error body: `{"statusCode": "409", "error": "Duplicate", "message": "..."}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(rename = "statusCode", default)]
    status_code: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn code(&self) -> Option<u16> {
        match self.status_code.as_ref()? {
            serde_json::Value::String(s) => s.parse().ok(),
            serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            _ => None,
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|t| t.and_utc())
        })
}

/// Turns a non-2xx response into a `StoreError`.
///
/// The gateway sometimes answers a duplicate with HTTP 400 and puts 409 in
/// the body, so both places are checked.
fn rejection(status: StatusCode, body: &str, target: &str) -> StoreError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    if status == StatusCode::CONFLICT
        || parsed.code() == Some(409)
        || parsed.error.as_deref() == Some("Duplicate")
    {
        return StoreError::AlreadyExists(target.to_string());
    }

    let message = match parsed.message {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => status.canonical_reason().unwrap_or("no detail").to_string(),
    };
    StoreError::Rejected {
        status: status.as_u16(),
        error: parsed.error,
        message,
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Transport(describe_reqwest_error(&e))
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn upload(
        &self,
        path: &RemoteObjectPath,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<StoredObject, StoreError> {
        let url = self.object_url(path);
        debug!(%url, size = bytes.len(), upsert = options.upsert, "uploading object");

        let response = self
            .authorized(self.client.post(url))
            .header(CONTENT_TYPE, options.content_type.as_str())
            .header(CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", if options.upsert { "true" } else { "false" })
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(rejection(status, &body, &path.to_string()));
        }

        // 2xx なら保存済み。本文は Key を拾うためだけに読む
        let key = serde_json::from_str::<UploadResponse>(&body)
            .ok()
            .and_then(|r| r.key);
        Ok(StoredObject {
            path: path.to_string(),
            key,
        })
    }

    async fn list(
        &self,
        prefix: &Namespace,
        options: &ListOptions,
    ) -> Result<Vec<ListingEntry>, StoreError> {
        let url = self.list_url();
        debug!(%url, prefix = %prefix, limit = options.limit, "listing objects");

        let request = ListRequest {
            prefix: prefix.as_str(),
            limit: options.limit,
            offset: options.offset,
            sort_by: SortBy {
                column: "name",
                order: "asc",
            },
        };
        let response = self
            .authorized(self.client.post(url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(rejection(status, &body, prefix.as_str()));
        }

        let raw: Vec<RawListEntry> =
            serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(raw.into_iter().map(RawListEntry::into_entry).collect())
    }

    fn public_url(&self, path: &RemoteObjectPath) -> Url {
        let base = ["storage", "v1", "object", "public", self.bucket.as_str()];
        join_segments(&self.endpoint, base.into_iter().chain(path.segments()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FIXTURE_CONTENT, FIXTURE_CONTENT_TYPE, FixtureName};
    use crate::impls::http_client;
    use chrono::TimeZone;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn storage_for(base_url: &str) -> SupabaseStorage {
        let config = ProbeConfig::new(
            Url::parse(base_url).unwrap(),
            Credential::new("valid-key"),
            Namespace::new("EVT42"),
        );
        SupabaseStorage::new(http_client(Duration::from_secs(5)).unwrap(), &config)
    }

    fn fixture_path() -> RemoteObjectPath {
        RemoteObjectPath::new(Namespace::new("EVT42"), FixtureName::from_millis(1_704_110_400_000))
    }

    #[tokio::test]
    async fn upload_sends_bytes_with_no_overwrite_headers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/storage/v1/object/media/EVT42/1704110400000-test.txt")
                    .header("authorization", "Bearer valid-key")
                    .header("apikey", "valid-key")
                    .header("content-type", "text/plain")
                    .header("x-upsert", "false")
                    .body("hello from cursor");
                then.status(200).json_body(json!({
                    "Key": "media/EVT42/1704110400000-test.txt",
                    "Id": "0f0c3f43-2d8b-4d0e-9d43-5a1b2c3d4e5f"
                }));
            })
            .await;

        let storage = storage_for(&server.base_url());
        let stored = storage
            .upload(
                &fixture_path(),
                FIXTURE_CONTENT.to_vec(),
                &UploadOptions::no_overwrite(FIXTURE_CONTENT_TYPE),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(stored.path, "EVT42/1704110400000-test.txt");
        assert_eq!(stored.key.as_deref(), Some("media/EVT42/1704110400000-test.txt"));
    }

    #[tokio::test]
    async fn upload_tolerates_empty_success_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200);
            })
            .await;

        let stored = storage_for(&server.base_url())
            .upload(
                &fixture_path(),
                FIXTURE_CONTENT.to_vec(),
                &UploadOptions::no_overwrite(FIXTURE_CONTENT_TYPE),
            )
            .await
            .unwrap();
        assert_eq!(stored.key, None);
    }

    #[tokio::test]
    async fn duplicate_in_body_maps_to_already_exists() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(400).json_body(json!({
                    "statusCode": "409",
                    "error": "Duplicate",
                    "message": "The resource already exists"
                }));
            })
            .await;

        let err = storage_for(&server.base_url())
            .upload(
                &fixture_path(),
                FIXTURE_CONTENT.to_vec(),
                &UploadOptions::no_overwrite(FIXTURE_CONTENT_TYPE),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(p) if p == "EVT42/1704110400000-test.txt"));
    }

    #[tokio::test]
    async fn policy_rejection_keeps_provider_detail() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(403).json_body(json!({
                    "statusCode": "403",
                    "error": "Unauthorized",
                    "message": "new row violates row-level security policy"
                }));
            })
            .await;

        let err = storage_for(&server.base_url())
            .upload(
                &fixture_path(),
                FIXTURE_CONTENT.to_vec(),
                &UploadOptions::no_overwrite(FIXTURE_CONTENT_TYPE),
            )
            .await
            .unwrap_err();
        match err {
            StoreError::Rejected {
                status,
                error,
                message,
            } => {
                assert_eq!(status, 403);
                assert_eq!(error.as_deref(), Some("Unauthorized"));
                assert!(message.contains("row-level security"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn plain_text_rejection_uses_body_as_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(502).body("upstream unavailable");
            })
            .await;

        let err = storage_for(&server.base_url())
            .list(&Namespace::new("EVT42"), &ListOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Rejected { status: 502, ref message, .. } if message == "upstream unavailable"
        ));
    }

    #[tokio::test]
    async fn list_posts_prefix_and_parses_entries() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/storage/v1/object/list/media")
                    .header("apikey", "valid-key")
                    .json_body(json!({
                        "prefix": "EVT42",
                        "limit": 1000,
                        "offset": 0,
                        "sortBy": { "column": "name", "order": "asc" }
                    }));
                then.status(200).json_body(json!([
                    {
                        "name": "1704110400000-test.txt",
                        "id": "0f0c3f43-2d8b-4d0e-9d43-5a1b2c3d4e5f",
                        "created_at": "2024-01-01T12:00:00.000Z",
                        "updated_at": "2024-01-01T12:00:00.000Z",
                        "metadata": { "size": 17, "mimetype": "text/plain" }
                    },
                    { "name": "nested", "id": null, "created_at": null, "metadata": null }
                ]));
            })
            .await;

        let entries = storage_for(&server.base_url())
            .list(&Namespace::new("EVT42"), &ListOptions::default())
            .await
            .unwrap();

        mock.assert_async().await;
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            entries,
            vec![
                ListingEntry::file("1704110400000-test.txt", 17, at),
                ListingEntry::folder("nested"),
            ]
        );
    }

    #[tokio::test]
    async fn list_rejects_non_array_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/storage/v1/object/list/media");
                then.status(200).json_body(json!({ "unexpected": true }));
            })
            .await;

        let err = storage_for(&server.base_url())
            .list(&Namespace::new("EVT42"), &ListOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        // nothing listens on port 1
        let err = storage_for("http://127.0.0.1:1")
            .list(&Namespace::new("EVT42"), &ListOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }

    #[test]
    fn public_url_follows_bucket_layout() {
        let storage = storage_for("https://storage.example");
        let url = storage.public_url(&fixture_path());
        assert_eq!(
            url.as_str(),
            "https://storage.example/storage/v1/object/public/media/EVT42/1704110400000-test.txt"
        );
    }

    #[test]
    fn timestamps_without_offset_are_read_as_utc() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-01T12:00:00.000Z"), Some(at));
        assert_eq!(parse_timestamp("2024-01-01T12:00:00"), Some(at));
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
