//! Status - 実行結果のレポート
//!
//! 成功時に何が確認できたかを説明する。失敗時は `CheckError` がそのまま結果になる
//! （部分成功のレポートはしない）。

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::ListingEntry;

/// CheckReport は全ステップ成功時の結果
///
/// # 使用例
/// ```ignore
/// let report = check.run().await?;
/// println!("{}", serde_json::to_string_pretty(&report)?);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// `{unixTimestampMillis}-test.txt`
    pub fixture_name: String,
    /// `{namespace}/{fixtureName}`
    pub remote_path: String,
    /// Path the store says it wrote.
    pub stored_path: String,
    /// Storage-side object key (`{bucket}/{path}`), when the store reports one.
    pub stored_key: Option<String>,
    pub local_fixture: PathBuf,
    pub listing: Vec<ListingEntry>,
    /// Whether the listing contained the uploaded fixture by exact name.
    pub fixture_listed: bool,
    pub public_url: String,
    pub probe_status: u16,
    pub elapsed_ms: u64,
}

impl CheckReport {
    pub fn listed_fixture(&self) -> Option<&ListingEntry> {
        self.listing.iter().find(|e| e.name == self.fixture_name)
    }
}
