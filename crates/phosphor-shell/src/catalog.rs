#![forbid(unsafe_code)]

//! Static menu catalog.
//!
//! The catalog is the ordered table the menu lists: display name, type tag,
//! description and the name of the process each entry launches. It is loaded
//! once at boot, either from the built-in table or from a JSON file:
//!
//! ```json
//! {
//!   "entries": [
//!     { "name": "DASHBOARD", "type": "<APP>", "description": "System status", "target": "dashboard" }
//!   ],
//!   "ticker": ["WELCOME BACK"]
//! }
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One menu row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub description: String,
    /// Process name to launch. Entries without one are listed but inert.
    #[serde(default)]
    pub target: Option<String>,
}

impl CatalogEntry {
    #[must_use]
    pub fn new(name: &str, type_tag: &str, description: &str, target: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            type_tag: type_tag.to_string(),
            description: description.to_string(),
            target: target.map(str::to_string),
        }
    }
}

/// The full configuration table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    /// Initial ticker messages.
    #[serde(default)]
    pub ticker: Vec<String>,
}

/// Errors from loading a catalog file.
#[derive(Debug)]
pub enum CatalogError {
    /// The file could not be read.
    Io { path: PathBuf, source: io::Error },
    /// The file is not valid catalog JSON.
    Parse(serde_json::Error),
    /// An entry is unusable.
    Invalid { index: usize, reason: &'static str },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read catalog {}: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid catalog: {err}"),
            Self::Invalid { index, reason } => write!(f, "catalog entry {index}: {reason}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

impl Catalog {
    /// The catalog shipped with the binary.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                CatalogEntry::new(
                    "DASHBOARD",
                    "<APP>",
                    "Reactor, memory and uplink telemetry",
                    Some("dashboard"),
                ),
                CatalogEntry::new(
                    "TERMLINK",
                    "<APP>",
                    "Interactive maintenance log",
                    Some("fiction"),
                ),
                CatalogEntry::new(
                    "HOLOTAPES",
                    "<DIR>",
                    "Recorded audio archive",
                    Some("media"),
                ),
                CatalogEntry::new(
                    "REPOSITORIES",
                    "<DIR>",
                    "Project records and release notes",
                    Some("repos"),
                ),
                CatalogEntry::new(
                    "ARCADE",
                    "<DIR>",
                    "Cartridge bay offline pending repair",
                    Some("arcade"),
                ),
            ],
            ticker: vec![
                "ALL SYSTEMS NOMINAL".to_string(),
                "USE ARROWS OR WASD TO NAVIGATE, ENTER TO SELECT".to_string(),
                "UPLINK STABLE".to_string(),
            ],
        }
    }

    /// Parse and validate catalog JSON.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Read a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(CatalogError::Invalid {
                    index,
                    reason: "name is empty",
                });
            }
            if entry.name.contains(['\n', '\r']) || entry.description.contains(['\n', '\r']) {
                return Err(CatalogError::Invalid {
                    index,
                    reason: "text spans more than one line",
                });
            }
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
