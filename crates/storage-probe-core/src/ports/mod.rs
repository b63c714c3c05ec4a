//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（オブジェクトストレージ、HTTP、時計、出力先）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - ストレージの意味論は外部サービスが持つ（ここでは再実装しない）
//! - HealthCheck は trait object 経由でしか外部に触れない
//! - テストでは InMemory 実装と FixedClock に差し替える

pub mod access_probe;
pub mod clock;
pub mod event_sink;
pub mod object_store;

// 主要な trait を再エクスポート
pub use self::access_probe::{AccessProbe, ProbeError, ProbeResponse};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_sink::EventSink;
pub use self::object_store::{
    DEFAULT_LIST_LIMIT, ListOptions, ObjectStore, StoreError, StoredObject, UploadOptions,
};
