//! AccessProbe port - 公開 URL への到達確認
//!
//! HEAD リクエストを 1 回だけ送ります（リトライなし）。
//! 本文はダウンロードしません。

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Status line of a probe response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeResponse {
    pub status: u16,
}

impl ProbeResponse {
    /// 2xx only. Redirects that the transport did not follow count as failure.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// ProbeError は URL に到達できなかったことを表す
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("could not reach url: {0}")]
    Transport(String),
}

/// AccessProbe は URL が認証なしで読めるかを確かめる
#[async_trait]
pub trait AccessProbe: Send + Sync {
    async fn head(&self, url: &Url) -> Result<ProbeResponse, ProbeError>;
}
