//! User settings with documented defaults and JSON persistence.
//!
//! # Responsibility
//! - Define recognized options and their defaults.
//! - Load stored settings merged over defaults; persist on every change.
//!
//! # Invariants
//! - Keys are camelCase on disk; unknown keys are ignored.
//! - A missing settings file yields defaults and is not an error.
//! - A stored value of the wrong type falls back to that key's default;
//!   only a file that is not a JSON object fails to load.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Annotation used for automatically reciprocated links.
pub const CROSS_LINK_DESCRIPTION: &str = "Cross-reference";

/// Recognized options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Link new or renamed addressed notes to their parent automatically.
    pub auto_process: bool,
    /// Show informational notices after automatic actions.
    pub show_notifications: bool,
    /// Reciprocate manually added links.
    pub auto_bidirectional_links: bool,
    /// Annotation after the backlink in a child note.
    pub parent_link_description: String,
    /// Annotation after the forward link in a parent note.
    pub child_link_description: String,
    /// Section holding the parent backlink.
    pub backlink_heading: String,
    /// Section holding forward links to children.
    pub forward_link_heading: String,
    /// Section holding reciprocated cross-links.
    pub cross_link_heading: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_process: true,
            show_notifications: true,
            auto_bidirectional_links: true,
            parent_link_description: "Parent".to_string(),
            child_link_description: "Child".to_string(),
            backlink_heading: "Related Notes".to_string(),
            forward_link_heading: "Child Notes".to_string(),
            cross_link_heading: "Related Notes".to_string(),
        }
    }
}

impl Settings {
    /// Sets one option from its on-disk key and a textual value.
    ///
    /// # Errors
    /// - `UnknownKey` when `key` is not a recognized option.
    /// - `InvalidValue` when a boolean option gets a non-boolean value.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let flag = |value: &str| match value.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(SettingsError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            }),
        };
        match key {
            "autoProcess" => self.auto_process = flag(value)?,
            "showNotifications" => self.show_notifications = flag(value)?,
            "autoBidirectionalLinks" => self.auto_bidirectional_links = flag(value)?,
            "parentLinkDescription" => self.parent_link_description = value.to_string(),
            "childLinkDescription" => self.child_link_description = value.to_string(),
            "backlinkHeading" => self.backlink_heading = value.to_string(),
            "forwardLinkHeading" => self.forward_link_heading = value.to_string(),
            "crossLinkHeading" => self.cross_link_heading = value.to_string(),
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

/// Errors from settings load/store.
#[derive(Debug)]
pub enum SettingsError {
    /// Settings file could not be read or written.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Stored settings are not valid JSON for [`Settings`].
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Option name is not recognized.
    UnknownKey(String),
    /// Option value has the wrong shape.
    InvalidValue { key: String, value: String },
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "settings i/o failure at `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid settings file `{}`: {source}", path.display())
            }
            Self::UnknownKey(key) => write!(f, "unknown setting `{key}`"),
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for setting `{key}`")
            }
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::UnknownKey(_) | Self::InvalidValue { .. } => None,
        }
    }
}

/// Settings bound to their backing file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Loads settings from `path`, merged over defaults.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let settings = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => Settings::default(),
            Ok(contents) => merge_over_defaults(&contents).map_err(|source| {
                SettingsError::Parse {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => Settings::default(),
            Err(source) => return Err(SettingsError::Io { path, source }),
        };
        Ok(Self { path, settings })
    }

    /// Current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Backing file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` and persists the result.
    ///
    /// The in-memory value is only replaced when the write succeeds.
    pub fn update<F>(&mut self, change: F) -> Result<&Settings, SettingsError>
    where
        F: FnOnce(&mut Settings) -> Result<(), SettingsError>,
    {
        let mut next = self.settings.clone();
        change(&mut next)?;
        self.persist(&next)?;
        self.settings = next;
        Ok(&self.settings)
    }

    fn persist(&self, settings: &Settings) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(settings).map_err(|source| {
            SettingsError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(
            "event=settings_saved module=settings status=ok path={}",
            self.path.display()
        );
        Ok(())
    }
}

/// Applies stored keys one by one, skipping values that do not fit.
fn merge_over_defaults(contents: &str) -> Result<Settings, serde_json::Error> {
    let stored: Map<String, Value> = serde_json::from_str(contents)?;
    let mut accepted = Map::new();
    for (key, value) in stored {
        let single = Map::from_iter([(key.clone(), value.clone())]);
        match serde_json::from_value::<Settings>(Value::Object(single)) {
            Ok(_) => {
                accepted.insert(key, value);
            }
            Err(err) => warn!(
                "event=settings_load module=settings status=skip key={} error={}",
                key, err
            ),
        }
    }
    serde_json::from_value(Value::Object(accepted))
}
