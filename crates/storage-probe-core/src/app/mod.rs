//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせて health check のシーケンスを実装します。
//!
//! # 主要コンポーネント
//! - **HealthCheckBuilder**: HealthCheck の構築とワイヤリング
//! - **HealthCheck**: prepare → upload → list → resolve → probe の直線チェーン
//! - **load_configuration**: 環境からの設定読み込み（ネットワーク前）
//! - **CheckReport**: 成功時の結果

pub mod builder;
pub mod health_check;
pub mod status;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, HealthCheckBuilder};
pub use self::health_check::{HealthCheck, load_configuration};
pub use self::status::CheckReport;
