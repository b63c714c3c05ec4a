//! Fixture model: the local test file and where it lands remotely.
//!
//! The remote name is derived from a millisecond timestamp, so two runs in
//! the same millisecond would collide. Upload is no-overwrite, so such a
//! collision surfaces as an upload error rather than a silent replace.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::config::Namespace;

/// Fixed fixture body.
pub const FIXTURE_CONTENT: &[u8] = b"hello from cursor";

/// Local file name inside the scratch directory, and the suffix of the remote name.
pub const FIXTURE_FILE_NAME: &str = "test.txt";

pub const FIXTURE_CONTENT_TYPE: &str = "text/plain";

/// `{unixTimestampMillis}-test.txt`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FixtureName(String);

impl FixtureName {
    pub fn from_millis(millis: i64) -> Self {
        Self(format!("{millis}-{FIXTURE_FILE_NAME}"))
    }

    pub fn at(time: DateTime<Utc>) -> Self {
        Self::from_millis(time.timestamp_millis())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FixtureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `{namespace}/{fixtureName}`, or just `{fixtureName}` at the bucket root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteObjectPath {
    namespace: Namespace,
    name: FixtureName,
}

impl RemoteObjectPath {
    pub fn new(namespace: Namespace, name: FixtureName) -> Self {
        Self { namespace, name }
    }

    /// Path segments, for building request URLs.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.namespace
            .segments()
            .chain(std::iter::once(self.name.as_str()))
    }
}

impl fmt::Display for RemoteObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.namespace, self.name)
        }
    }
}

/// A fixture written to local disk for this run.
///
/// Lives until the process exits; nothing reuses it.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub local_path: PathBuf,
    pub name: FixtureName,
}

impl Fixture {
    pub fn new(local_path: PathBuf, created_at: DateTime<Utc>) -> Self {
        Self {
            local_path,
            name: FixtureName::at(created_at),
        }
    }

    pub fn remote_path(&self, namespace: &Namespace) -> RemoteObjectPath {
        RemoteObjectPath::new(namespace.clone(), self.name.clone())
    }
}
