//! HttpAccessProbe - reqwest による HEAD probe

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::describe_reqwest_error;
use crate::ports::{AccessProbe, ProbeError, ProbeResponse};

/// HttpAccessProbe は公開 URL に HEAD を 1 回送る
///
/// リダイレクトは reqwest の既定どおり追従する。認証ヘッダは付けない
/// （認証なしで読めることを確かめるのが目的）。
pub struct HttpAccessProbe {
    client: reqwest::Client,
}

impl HttpAccessProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AccessProbe for HttpAccessProbe {
    async fn head(&self, url: &Url) -> Result<ProbeResponse, ProbeError> {
        debug!(%url, "probing public access");
        let response = self.client.head(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout(describe_reqwest_error(&e))
            } else {
                ProbeError::Transport(describe_reqwest_error(&e))
            }
        })?;
        Ok(ProbeResponse {
            status: response.status().as_u16(),
        })
    }
}
