//! EventSink port - 進捗イベントの出力先
//!
//! # 実装
//! - TracingEventSink: `tracing` で構造化ログ（impls）
//! - MemoryEventSink: 記録するだけ（テスト用、impls）
//! - CLI 側の ConsoleEventSink: 人間向けの進捗表示

use crate::domain::CheckEvent;

/// EventSink は CheckEvent を受け取る
///
/// emit は同期で、失敗しない。出力の失敗で health check の結果を変えない。
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &CheckEvent);
}
