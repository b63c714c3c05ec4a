//! storage-probe-core
//!
//! Core building blocks for the storage backend health check.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（config, fixture, listing, step, errors, events）
//! - **ports**: 抽象化レイヤー（ObjectStore, AccessProbe, Clock, EventSink）
//! - **app**: アプリケーションロジック（builder, health_check, status）
//! - **impls**: 実装（SupabaseStorage, HttpAccessProbe と、テスト用の InMemory 実装）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
