//! Configuration and settings management.
//!
//! Settings are passed explicitly into each component. They come from
//! built-in defaults, optionally overridden by a JSON file.

mod settings;

pub use settings::{AiSettings, ReplyParsing, Settings, SettingsError, SETTINGS_FILE};
