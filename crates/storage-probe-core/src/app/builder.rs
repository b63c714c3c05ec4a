//! HealthCheckBuilder - HealthCheck の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - `Arc<dyn Trait>` による実装の差し替え

use std::sync::Arc;

use super::health_check::HealthCheck;
use crate::domain::ProbeConfig;
use crate::impls::TracingEventSink;
use crate::ports::{AccessProbe, Clock, EventSink, ObjectStore, SystemClock};

/// HealthCheckBuilder は HealthCheck を構築
///
/// # 使用例
/// ```ignore
/// let check = HealthCheckBuilder::new(config)
///     .store(Arc::new(SupabaseStorage::new(client.clone(), &config)))
///     .probe(Arc::new(HttpAccessProbe::new(client)))
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - store と probe は必須（既定値なし）
/// - clock は SystemClock、events は TracingEventSink が既定
/// - 不足があれば build() が BuildError を返す（ネットワークには触れない）
pub struct HealthCheckBuilder {
    config: ProbeConfig,
    store: Option<Arc<dyn ObjectStore>>,
    probe: Option<Arc<dyn AccessProbe>>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
}

/// BuildError は HealthCheck 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing component: {0}. It must be provided before build().")]
    MissingComponent(&'static str),
}

impl HealthCheckBuilder {
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            config,
            store: None,
            probe: None,
            clock: Arc::new(SystemClock),
            events: Arc::new(TracingEventSink),
        }
    }

    pub fn store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn probe(mut self, probe: Arc<dyn AccessProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// # 検証
    /// - store / probe が設定されているかチェック
    pub fn build(self) -> Result<HealthCheck, BuildError> {
        let store = self.store.ok_or(BuildError::MissingComponent("object store"))?;
        let probe = self.probe.ok_or(BuildError::MissingComponent("access probe"))?;
        Ok(HealthCheck::new(
            self.config,
            store,
            probe,
            self.clock,
            self.events,
        ))
    }
}
