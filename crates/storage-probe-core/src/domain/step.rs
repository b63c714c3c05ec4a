//! Steps of a health-check run, in execution order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of the verification chain.
///
/// The chain is strictly linear: a step only runs if every earlier step
/// succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStep {
    LoadConfiguration,
    PrepareFixture,
    UploadFixture,
    ListFolder,
    ResolvePublicUrl,
    ProbePublicAccess,
}

impl CheckStep {
    pub const fn label(self) -> &'static str {
        match self {
            CheckStep::LoadConfiguration => "load configuration",
            CheckStep::PrepareFixture => "prepare fixture",
            CheckStep::UploadFixture => "upload fixture",
            CheckStep::ListFolder => "list folder",
            CheckStep::ResolvePublicUrl => "resolve public url",
            CheckStep::ProbePublicAccess => "probe public access",
        }
    }
}

impl fmt::Display for CheckStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
