//! HealthCheck - ストレージバックエンドの検証シーケンス
//!
//! # フロー
//! 1. load_configuration() で設定を読む（ネットワークに触れる前）
//! 2. prepare_fixture() で `{scratch_dir}/test.txt` を書く
//! 3. upload_fixture() で `{namespace}/{ts}-test.txt` にアップロード（上書き禁止）
//! 4. list_folder() で namespace 直下を最大 1000 件取得
//! 5. resolve_public_url() で公開 URL を計算（ネットワークなし）
//! 6. probe_public_access() で HEAD を 1 回
//!
//! 直線的なチェーンで、分岐もリトライもない。最初の失敗で打ち切り、
//! 以降のステップは実行しない。

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};
use url::Url;

use super::status::CheckReport;
use crate::domain::{
    AccessFailure, CheckError, CheckEvent, FIXTURE_CONTENT, FIXTURE_CONTENT_TYPE,
    FIXTURE_FILE_NAME, Fixture, ListingEntry, NamespacePolicy, ProbeConfig, RemoteObjectPath,
};
use crate::ports::{
    AccessProbe, Clock, EventSink, ListOptions, ObjectStore, ProbeResponse, StoredObject,
    UploadOptions,
};

/// 設定を読み込む（ステップ 1）
///
/// 失敗は `CheckError::Configuration` として sink に通知してから返す。
/// HealthCheck は `ProbeConfig` なしには作れないので、ここで失敗すれば
/// ネットワーク呼び出しは 1 回も起きない。
pub fn load_configuration<F>(
    lookup: F,
    policy: NamespacePolicy,
    events: &dyn EventSink,
) -> Result<ProbeConfig, CheckError>
where
    F: Fn(&str) -> Option<String>,
{
    ProbeConfig::from_lookup(lookup, policy).map_err(|e| {
        let err = CheckError::from(e);
        events.emit(&CheckEvent::StepFailed {
            step: err.step(),
            message: err.to_string(),
        });
        err
    })
}

/// HealthCheck は 1 回分の検証を実行する
///
/// 各ステップは前のステップの出力を値で受け取り、共有可変状態は持たない。
pub struct HealthCheck {
    config: ProbeConfig,
    store: Arc<dyn ObjectStore>,
    probe: Arc<dyn AccessProbe>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
}

impl HealthCheck {
    pub(crate) fn new(
        config: ProbeConfig,
        store: Arc<dyn ObjectStore>,
        probe: Arc<dyn AccessProbe>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            store,
            probe,
            clock,
            events,
        }
    }

    /// Run steps 2 to 6. Binary pass/fail: no partial report on failure.
    pub async fn run(&self) -> Result<CheckReport, CheckError> {
        let started = Instant::now();
        self.events.emit(&CheckEvent::Starting {
            namespace: self.config.namespace.clone(),
        });

        match self.run_steps(started).await {
            Ok(report) => {
                self.events.emit(&CheckEvent::Passed);
                Ok(report)
            }
            Err(err) => {
                self.events.emit(&CheckEvent::StepFailed {
                    step: err.step(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    async fn run_steps(&self, started: Instant) -> Result<CheckReport, CheckError> {
        let fixture = self.prepare_fixture().await?;
        let remote_path = fixture.remote_path(&self.config.namespace);

        let stored = self.upload_fixture(&fixture, &remote_path).await?;

        let listing = self.list_folder().await?;
        let fixture_listed = listing.iter().any(|e| e.name == fixture.name.as_str());
        if !fixture_listed {
            self.events.emit(&CheckEvent::FixtureNotListed {
                name: fixture.name.clone(),
            });
        }

        let public_url = self.resolve_public_url(&remote_path);
        let response = self.probe_public_access(&public_url).await?;

        if self.config.cleanup_fixture {
            self.remove_fixture(&fixture).await;
        }

        Ok(CheckReport {
            fixture_name: fixture.name.to_string(),
            remote_path: remote_path.to_string(),
            stored_path: stored.path,
            stored_key: stored.key,
            local_fixture: fixture.local_path,
            listing,
            fixture_listed,
            public_url: public_url.to_string(),
            probe_status: response.status,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }

    /// ステップ 2: scratch ディレクトリを作り（冪等）、固定内容を書く
    pub async fn prepare_fixture(&self) -> Result<Fixture, CheckError> {
        let dir = &self.config.scratch_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| CheckError::filesystem(dir.clone(), e))?;

        let path = dir.join(FIXTURE_FILE_NAME);
        tokio::fs::write(&path, FIXTURE_CONTENT)
            .await
            .map_err(|e| CheckError::filesystem(path.clone(), e))?;

        self.events.emit(&CheckEvent::FixtureWritten { path: path.clone() });
        Ok(Fixture::new(path, self.clock.now()))
    }

    /// ステップ 3: ローカルの fixture を読み戻してアップロード
    pub async fn upload_fixture(
        &self,
        fixture: &Fixture,
        path: &RemoteObjectPath,
    ) -> Result<StoredObject, CheckError> {
        let bytes = tokio::fs::read(&fixture.local_path)
            .await
            .map_err(|e| CheckError::filesystem(fixture.local_path.clone(), e))?;

        self.events
            .emit(&CheckEvent::UploadStarted { path: path.clone() });
        let stored = self
            .store
            .upload(path, bytes, &UploadOptions::no_overwrite(FIXTURE_CONTENT_TYPE))
            .await
            .map_err(|source| CheckError::Upload {
                path: path.to_string(),
                source,
            })?;

        self.events.emit(&CheckEvent::Uploaded {
            stored_path: stored.path.clone(),
        });
        Ok(stored)
    }

    /// ステップ 4: namespace 直下を一覧（順序はストア任せ）
    pub async fn list_folder(&self) -> Result<Vec<ListingEntry>, CheckError> {
        let prefix = &self.config.namespace;
        self.events.emit(&CheckEvent::ListingStarted {
            prefix: prefix.clone(),
        });

        let entries = self
            .store
            .list(prefix, &ListOptions::default())
            .await
            .map_err(|source| CheckError::List {
                prefix: prefix.to_string(),
                source,
            })?;

        for entry in &entries {
            self.events.emit(&CheckEvent::Listed(entry.clone()));
        }
        Ok(entries)
    }

    /// ステップ 5: 公開 URL の計算。失敗しない
    pub fn resolve_public_url(&self, path: &RemoteObjectPath) -> Url {
        let url = self.store.public_url(path);
        self.events
            .emit(&CheckEvent::PublicUrlResolved { url: url.clone() });
        url
    }

    /// ステップ 6: HEAD probe。2xx 以外と到達不能はどちらも AccessError
    pub async fn probe_public_access(&self, url: &Url) -> Result<ProbeResponse, CheckError> {
        self.events
            .emit(&CheckEvent::ProbeStarted { url: url.clone() });

        let response = self
            .probe
            .head(url)
            .await
            .map_err(|e| CheckError::Access {
                url: url.to_string(),
                failure: AccessFailure::from(e),
            })?;

        if !response.is_success() {
            return Err(CheckError::Access {
                url: url.to_string(),
                failure: AccessFailure::Status(response.status),
            });
        }

        self.events.emit(&CheckEvent::PublicAccessConfirmed {
            status: response.status,
        });
        Ok(response)
    }

    async fn remove_fixture(&self, fixture: &Fixture) {
        match tokio::fs::remove_file(&fixture.local_path).await {
            Ok(()) => debug!(path = %fixture.local_path.display(), "removed local fixture"),
            Err(e) => warn!(
                path = %fixture.local_path.display(),
                error = %e,
                "could not remove local fixture"
            ),
        }
    }
}
