//! Optional `.md-orphan.toml` settings merged with command-line flags.

use std::path::Path;

use crate::error::Error;
use crate::exclude::ExcludeMatcher;

/// File name of the optional per-root config.
pub const CONFIG_FILE_NAME: &str = ".md-orphan.toml";

/// Crawl configuration loaded from `.md-orphan.toml` and the command line.
/// Exclude patterns from the file come first, command-line patterns after.
#[derive(Debug)]
pub struct Config {
    /// Whether link fragments are validated against target headings.
    anchors: bool,
    /// Raw exclusion patterns, compiled by [`Config::exclude_matcher`].
    exclude: Vec<String>,
}

/// Raw TOML structure for `.md-orphan.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct MdOrphanTomlConfig {
    /// Validate link fragments; defaults to on.
    #[serde(default = "enabled")]
    anchors: bool,
    /// Exclusion patterns relative to the crawl root.
    #[serde(default)]
    exclude: Vec<String>,
}

impl Config {
    /// Whether broken-anchor checks run.
    pub const fn anchors_enabled(&self) -> bool {
        return self.anchors;
    }

    /// Turn off fragment validation.
    pub const fn disable_anchors(&mut self) {
        self.anchors = false;
    }

    /// Compile every configured exclusion pattern.
    ///
    /// # Errors
    ///
    /// Returns `Error::GlobstarUnsupported` or `Error::InvalidPattern` for
    /// the first malformed pattern.
    pub fn exclude_matcher(&self) -> Result<ExcludeMatcher, Error> {
        return ExcludeMatcher::new(&self.exclude);
    }

    /// Append patterns given on the command line. Each value may hold
    /// several comma-separated patterns.
    pub fn extend_exclude<S: AsRef<str>>(&mut self, values: &[S]) {
        for value in values {
            self.exclude.extend(
                value
                    .as_ref()
                    .split(',')
                    .map(str::trim)
                    .filter(|p| return !p.is_empty())
                    .map(String::from),
            );
        }
    }

    /// Load config from `.md-orphan.toml` in the crawl root.
    /// Returns defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed: a config file
    /// the user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE_NAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::scan_everything_by_default()),
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content);
    }

    /// Load config from an explicitly named file.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` if the file doesn't exist,
    /// `Error::Io` for other read failures, or `Error::TomlDe` if malformed.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content);
    }

    /// Parse config TOML.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    fn parse(content: &str) -> Result<Self, Error> {
        let raw: MdOrphanTomlConfig = toml::from_str(content)?;
        return Ok(Self {
            anchors: raw.anchors,
            exclude: raw.exclude,
        });
    }

    /// Default config: check anchors, exclude nothing.
    const fn scan_everything_by_default() -> Self {
        return Self {
            anchors: true,
            exclude: Vec::new(),
        };
    }
}

/// Serde default for boolean switches that start on.
const fn enabled() -> bool {
    return true;
}
