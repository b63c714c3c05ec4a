//! EventSink 実装（tracing 出力と、テスト用の記録）

use std::sync::Mutex;

use tracing::{error, info, warn};

use crate::domain::CheckEvent;
use crate::ports::EventSink;

/// TracingEventSink は CheckEvent を構造化ログとして出す
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &CheckEvent) {
        match event {
            CheckEvent::Starting { namespace } => {
                info!(namespace = %namespace, "starting storage backend check");
                if namespace.is_empty() {
                    warn!("namespace is empty, using the bucket root");
                }
            }
            CheckEvent::FixtureWritten { path } => {
                info!(path = %path.display(), "created temp file")
            }
            CheckEvent::UploadStarted { path } => info!(path = %path, "uploading fixture"),
            CheckEvent::Uploaded { stored_path } => {
                info!(path = %stored_path, "fixture uploaded")
            }
            CheckEvent::ListingStarted { prefix } => info!(prefix = %prefix, "listing folder"),
            CheckEvent::Listed(entry) => info!(
                name = %entry.name,
                size_bytes = ?entry.size_bytes,
                created_at = ?entry.created_at,
                "listed object"
            ),
            CheckEvent::FixtureNotListed { name } => {
                warn!(name = %name, "uploaded fixture missing from listing")
            }
            CheckEvent::PublicUrlResolved { url } => info!(%url, "resolved public url"),
            CheckEvent::ProbeStarted { url } => info!(%url, "testing public access"),
            CheckEvent::PublicAccessConfirmed { status } => {
                info!(status, "public access confirmed")
            }
            CheckEvent::StepFailed { step, message } => {
                error!(step = ?step, %message, "storage backend check failed")
            }
            CheckEvent::Passed => info!("storage backend is working correctly"),
        }
    }
}

/// MemoryEventSink は受け取ったイベントを順に記録する（テスト用）
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<CheckEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CheckEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: &CheckEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
