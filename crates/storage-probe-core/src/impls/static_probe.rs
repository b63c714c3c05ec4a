//! StaticAccessProbe - 決まった結果を返す開発用・テスト用の probe

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use url::Url;

use crate::ports::{AccessProbe, ProbeError, ProbeResponse};

#[derive(Debug, Clone)]
enum Answer {
    Status(u16),
    Unreachable(String),
}

/// StaticAccessProbe は常に同じステータス（または到達不能）を返す
///
/// 受け取った URL を記録するので、どの URL が probe されたかを検証できる。
pub struct StaticAccessProbe {
    answer: Answer,
    calls: AtomicUsize,
    last_url: Mutex<Option<Url>>,
}

impl StaticAccessProbe {
    pub fn status(status: u16) -> Self {
        Self::answering(Answer::Status(status))
    }

    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self::answering(Answer::Unreachable(reason.into()))
    }

    fn answering(answer: Answer) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
            last_url: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn last_url(&self) -> Option<Url> {
        self.last_url.lock().ok().and_then(|u| u.clone())
    }
}

#[async_trait]
impl AccessProbe for StaticAccessProbe {
    async fn head(&self, url: &Url) -> Result<ProbeResponse, ProbeError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_url.lock() {
            *last = Some(url.clone());
        }
        match &self.answer {
            Answer::Status(status) => Ok(ProbeResponse { status: *status }),
            Answer::Unreachable(reason) => Err(ProbeError::Transport(reason.clone())),
        }
    }
}
