//! Optional per-corpus settings read from `.standoff.toml`.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Error;

/// Name of the optional per-corpus configuration file.
pub const CONFIG_FILE_NAME: &str = ".standoff.toml";

/// Corpus configuration loaded from `.standoff.toml` at the corpus root.
/// Include/exclude patterns are path prefixes applied to annotation files,
/// relative to the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    exclude: Vec<String>,
    include: Vec<String>,
    jobs: Option<usize>,
    labels: BTreeMap<String, String>,
}

/// Raw TOML structure for `.standoff.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct StandoffTomlConfig {
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    jobs: Option<usize>,
    #[serde(default)]
    labels: BTreeMap<String, String>,
}

impl Config {
    /// Load config from `.standoff.toml` in the given corpus root.
    /// Returns a default that scans everything if the file doesn't exist.
    /// Returns an error if the file exists but is malformed. A config the
    /// user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE_NAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content);
    }

    /// Parse config from TOML content.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: StandoffTomlConfig = toml::from_str(content)?;
        return Ok(Self {
            exclude: raw.exclude,
            include: raw.include,
            jobs: raw.jobs,
            labels: raw.labels,
        });
    }

    /// Check whether an annotation file path should be loaded.
    ///
    /// A path is included if no include patterns are set (load everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }

    /// Worker count requested by the config, if any.
    pub const fn jobs(&self) -> Option<usize> {
        return self.jobs;
    }

    /// Annotation label to training label mapping.
    pub const fn labels(&self) -> &BTreeMap<String, String> {
        return &self.labels;
    }
}
