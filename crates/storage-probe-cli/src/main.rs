//! storage-probe: ストレージバックエンドの疎通確認 CLI
//!
//! `.env` → 引数 → ログ初期化 → 設定読み込み → HealthCheck::run() → 終了コード
//! 0 = 全ステップ成功、1 = いずれかの失敗。

mod console;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde_json::json;
use storage_probe_core::app::{CheckReport, HealthCheckBuilder, load_configuration};
use storage_probe_core::domain::config::{BUCKET_VAR, SCRATCH_DIR_VAR, TIMEOUT_VAR};
use storage_probe_core::domain::{CheckError, CheckEvent, NamespacePolicy, ProbeConfig};
use storage_probe_core::impls::{HttpAccessProbe, SupabaseStorage, TracingEventSink, http_client};
use storage_probe_core::ports::EventSink;
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleEventSink;

/// Upload, list and publicly fetch a fixture to verify the storage backend.
#[derive(Debug, Parser)]
#[command(name = "storage-probe", version, about)]
struct Cli {
    /// Storage bucket (overrides STORAGE_BUCKET, default "media").
    #[arg(long)]
    bucket: Option<String>,

    /// Directory for the local fixture (overrides PROBE_SCRATCH_DIR, default "./tmp").
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// Per-request timeout in seconds (overrides PROBE_TIMEOUT_SECS, default 30).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Fail when NAMESPACE_CODE is not set instead of using the bucket root.
    #[arg(long)]
    require_namespace: bool,

    /// Remove the local fixture after a successful run.
    #[arg(long)]
    cleanup: bool,

    /// Print a JSON result on stdout instead of progress lines.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn namespace_policy(&self) -> NamespacePolicy {
        if self.require_namespace {
            NamespacePolicy::Required
        } else {
            NamespacePolicy::AllowEmpty
        }
    }

    /// Whether a flag replaces the environment variable `key`.
    fn overrides(&self, key: &str) -> bool {
        match key {
            BUCKET_VAR => self.bucket.is_some(),
            SCRATCH_DIR_VAR => self.scratch_dir.is_some(),
            TIMEOUT_VAR => self.timeout_secs.is_some(),
            _ => false,
        }
    }

    /// Flags win over environment values. Overridden variables are never
    /// read, so an invalid value there cannot fail the run.
    fn load_config<F>(&self, lookup: F, events: &dyn EventSink) -> Result<ProbeConfig, CheckError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = load_configuration(
            |key| if self.overrides(key) { None } else { lookup(key) },
            self.namespace_policy(),
            events,
        )?;
        Ok(self.apply(config))
    }

    fn apply(&self, mut config: ProbeConfig) -> ProbeConfig {
        if let Some(bucket) = &self.bucket {
            config = config.with_bucket(bucket.clone());
        }
        if let Some(dir) = &self.scratch_dir {
            config = config.with_scratch_dir(dir.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        config.with_cleanup(self.cleanup)
    }
}

fn init_tracing(json: bool) {
    // 進捗表示と重ならないよう、コンソールモードでは warn 以上だけ出す
    let default = if json { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // (A) .env は無くてもよい
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.json);
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let events: Arc<dyn EventSink> = if cli.json {
        Arc::new(TracingEventSink)
    } else {
        Arc::new(ConsoleEventSink)
    };

    // (B) 実行して結果を出力
    let result = run(&cli, events.clone()).await;
    match &result {
        Ok(report) if cli.json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "ok": true, "report": report }))?
            );
        }
        Err(err) if cli.json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "ok": false,
                    "step": err.step(),
                    "error": err.to_string(),
                }))?
            );
        }
        _ => {}
    }

    // (C) 終了コード
    Ok(match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => ExitCode::from(err.exit_code()),
    })
}

async fn run(cli: &Cli, events: Arc<dyn EventSink>) -> Result<CheckReport, CheckError> {
    let config = cli.load_config(|key| std::env::var(key).ok(), events.as_ref())?;

    let client = http_client(config.request_timeout).map_err(|e| {
        let err = CheckError::Unexpected(format!("failed to build HTTP client: {e}"));
        events.emit(&CheckEvent::StepFailed {
            step: err.step(),
            message: err.to_string(),
        });
        err
    })?;

    let check = HealthCheckBuilder::new(config.clone())
        .store(Arc::new(SupabaseStorage::new(client.clone(), &config)))
        .probe(Arc::new(HttpAccessProbe::new(client)))
        .events(events)
        .build()
        .map_err(|e| CheckError::Unexpected(e.to_string()))?;

    check.run().await
}
