//! Domain model (config, fixture, listing, steps, errors, events).

pub mod config;
pub mod errors;
pub mod events;
pub mod fixture;
pub mod listing;
pub mod step;

pub use self::config::{Credential, Namespace, NamespacePolicy, ProbeConfig};
pub use self::errors::{AccessFailure, CheckError, ConfigError};
pub use self::events::CheckEvent;
pub use self::fixture::{
    FIXTURE_CONTENT, FIXTURE_CONTENT_TYPE, FIXTURE_FILE_NAME, Fixture, FixtureName,
    RemoteObjectPath,
};
pub use self::listing::ListingEntry;
pub use self::step::CheckStep;
