//! ConsoleEventSink - 人間向けの進捗表示
//!
//! 表示形式は契約ではない。ログ（tracing）とは別に stdout / stderr へ直接書く。

use storage_probe_core::domain::CheckEvent;
use storage_probe_core::ports::EventSink;

#[derive(Debug, Default)]
pub struct ConsoleEventSink;

impl EventSink for ConsoleEventSink {
    fn emit(&self, event: &CheckEvent) {
        match event {
            CheckEvent::Starting { namespace } => {
                println!("🔧 Storage backend check\n");
                if namespace.is_empty() {
                    println!("⚠️  No namespace set, using the bucket root\n");
                } else {
                    println!("📋 Namespace: {namespace}\n");
                }
            }
            CheckEvent::FixtureWritten { path } => {
                println!("✅ Created temp file: {}", path.display())
            }
            CheckEvent::UploadStarted { path } => println!("⬆️  Uploading to: {path}"),
            CheckEvent::Uploaded { stored_path } => {
                println!("✅ Upload successful: {stored_path}\n")
            }
            CheckEvent::ListingStarted { prefix } => {
                if prefix.is_empty() {
                    println!("📂 Listing bucket root...");
                } else {
                    println!("📂 Listing files in {prefix}/...");
                }
            }
            CheckEvent::Listed(entry) => println!("   - {entry}"),
            CheckEvent::FixtureNotListed { name } => {
                println!("⚠️  {name} not in listing yet")
            }
            CheckEvent::PublicUrlResolved { url } => println!("\n🔗 Public URL: {url}"),
            CheckEvent::ProbeStarted { .. } => println!("🌐 Testing public access..."),
            CheckEvent::PublicAccessConfirmed { status } => {
                println!("✅ Public access works (HTTP {status})\n")
            }
            CheckEvent::StepFailed { step, message } => match step {
                Some(step) => eprintln!("❌ {step} failed: {message}"),
                None => eprintln!("❌ {message}"),
            },
            CheckEvent::Passed => println!("🎉 Storage backend is working correctly!"),
        }
    }
}
