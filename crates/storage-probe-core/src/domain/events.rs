//! Events - 実行中に発生するイベント
//!
//! HealthCheck は各ステップの進捗を `CheckEvent` として `EventSink` に流します。
//! コンソール表示やログ出力は sink 側の責務です（表示形式は契約ではない）。

use std::path::PathBuf;

use url::Url;

use super::config::Namespace;
use super::fixture::{FixtureName, RemoteObjectPath};
use super::listing::ListingEntry;
use super::step::CheckStep;

/// CheckEvent は health check の進捗イベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckEvent {
    /// 実行開始
    Starting { namespace: Namespace },
    /// ローカルに fixture を書き込んだ
    FixtureWritten { path: PathBuf },
    /// アップロード開始
    UploadStarted { path: RemoteObjectPath },
    /// アップロード成功（リモートが返した格納パス）
    Uploaded { stored_path: String },
    /// 一覧取得開始
    ListingStarted { prefix: Namespace },
    /// 一覧の 1 エントリ
    Listed(ListingEntry),
    /// 一覧にアップロードした fixture が見当たらない（警告のみ）
    FixtureNotListed { name: FixtureName },
    /// 公開 URL を解決した
    PublicUrlResolved { url: Url },
    /// HEAD probe 開始
    ProbeStarted { url: Url },
    /// 公開アクセス確認済み
    PublicAccessConfirmed { status: u16 },
    /// ステップが失敗した（以降のステップは実行しない）
    StepFailed {
        step: Option<CheckStep>,
        message: String,
    },
    /// 全ステップ成功
    Passed,
}
