//! Durable saves: the envelope format, the writer (including autosave
//! rotation) and the loader that rebuilds a game by replaying its log.
//!
//! Writer and loader share [`envelope`]; a save is only readable by a build
//! whose [`envelope::format_version_id`] matches the one in its header.

pub mod envelope;
pub mod loader;
pub mod writer;

pub use envelope::{format_version_id, SaveHeader, ACTION_SCHEMA_VERSION};
pub use loader::{GameLoader, LoadOutcome};
pub use writer::{AutosavePaths, SaveWriter};
