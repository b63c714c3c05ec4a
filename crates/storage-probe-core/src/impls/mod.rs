//! Impls - ports の実装
//!
//! # 本番用
//! - **SupabaseStorage**: Supabase Storage REST API
//! - **HttpAccessProbe**: reqwest による HEAD probe
//! - **TracingEventSink**: tracing への出力
//!
//! # 開発用・テスト用
//! - **InMemoryObjectStore**: プロセス内ストア（失敗注入つき）
//! - **StaticAccessProbe**: 固定ステータスを返す probe
//! - **MemoryEventSink**: イベントを記録するだけ

use std::time::Duration;

pub mod event_sinks;
pub mod http_probe;
pub mod inmem_store;
pub mod static_probe;
pub mod supabase_storage;

// 主要な型を再エクスポート
pub use self::event_sinks::{MemoryEventSink, TracingEventSink};
pub use self::http_probe::HttpAccessProbe;
pub use self::inmem_store::InMemoryObjectStore;
pub use self::static_probe::StaticAccessProbe;
pub use self::supabase_storage::SupabaseStorage;

/// Shared HTTP client for storage calls and the probe.
///
/// `timeout` applies per request; nothing is retried.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("storage-probe/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// reqwest's Display drops the cause ("connection refused" etc.), so walk it.
pub(crate) fn describe_reqwest_error(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
