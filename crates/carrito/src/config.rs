//! Run configuration: browser kind, environment detection, timeout bounds.
//!
//! Kind resolution precedence: explicit run configuration value, then the
//! `BROWSER` environment variable, then the hard-coded default. An
//! unrecognized kind is a [`CarritoError::Configuration`] that enumerates the
//! supported set; there is no silent fallback.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::result::{CarritoError, CarritoResult};

/// Default implicit element-lookup timeout
pub const DEFAULT_IMPLICIT_WAIT: Duration = Duration::from_secs(10);

/// Default page-load timeout
pub const DEFAULT_PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Default storefront URL
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/";

/// Environment variable consulted when no explicit kind is configured
pub const BROWSER_ENV_VAR: &str = "BROWSER";

/// Supported browser kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrowserKind {
    /// Google Chrome
    Chrome,
    /// Chrome without a display surface
    HeadlessChrome,
    /// Mozilla Firefox
    Firefox,
    /// Firefox without a display surface
    HeadlessFirefox,
    /// Microsoft Edge
    Edge,
}

impl BrowserKind {
    /// The full supported set, in canonical order
    pub const SUPPORTED: [Self; 5] = [
        Self::Chrome,
        Self::HeadlessChrome,
        Self::Firefox,
        Self::HeadlessFirefox,
        Self::Edge,
    ];

    /// Canonical kebab-case name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::HeadlessChrome => "headless-chrome",
            Self::Firefox => "firefox",
            Self::HeadlessFirefox => "headless-firefox",
            Self::Edge => "edge",
        }
    }

    /// Whether this kind nominally runs without a display surface
    #[must_use]
    pub const fn is_headless(&self) -> bool {
        matches!(self, Self::HeadlessChrome | Self::HeadlessFirefox)
    }

    /// Comma-separated enumeration of the supported set, for error messages
    #[must_use]
    pub fn supported_set() -> String {
        Self::SUPPORTED
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Resolve the kind to use for a scenario.
    ///
    /// Precedence: `explicit` > `BROWSER` env var > [`BrowserKind::Chrome`].
    ///
    /// # Errors
    ///
    /// Returns [`CarritoError::Configuration`] if the winning value is not a
    /// supported kind.
    pub fn resolve(explicit: Option<&str>, env: &Environment) -> CarritoResult<Self> {
        let from_env = env.var(BROWSER_ENV_VAR);
        let requested = explicit
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| from_env.map(str::trim).filter(|s| !s.is_empty()));
        match requested {
            Some(name) => name.parse(),
            None => Ok(Self::Chrome),
        }
    }
}

impl FromStr for BrowserKind {
    type Err = CarritoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "headless-chrome" => Ok(Self::HeadlessChrome),
            "firefox" => Ok(Self::Firefox),
            "headless-firefox" => Ok(Self::HeadlessFirefox),
            "edge" => Ok(Self::Edge),
            other => Err(CarritoError::Configuration {
                requested: other.to_string(),
                supported: Self::supported_set(),
            }),
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Process-environment probe.
///
/// Detection signals are injected rather than read inline so CI/container
/// switching is unit-testable.
#[derive(Debug, Clone)]
pub struct Environment {
    vars: HashMap<String, String>,
    docker_marker: PathBuf,
}

impl Environment {
    /// Snapshot the real process environment
    #[must_use]
    pub fn detect() -> Self {
        Self {
            vars: std::env::vars().collect(),
            docker_marker: PathBuf::from("/.dockerenv"),
        }
    }

    /// Build a fake environment from explicit variables
    #[must_use]
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            docker_marker: PathBuf::from("/nonexistent/.dockerenv"),
        }
    }

    /// Override the container marker path (test hook)
    #[must_use]
    pub fn with_docker_marker(mut self, path: impl Into<PathBuf>) -> Self {
        self.docker_marker = path.into();
        self
    }

    /// Look up a variable
    #[must_use]
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    fn flag(&self, name: &str) -> bool {
        self.var(name)
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
    }

    /// Whether the process is running inside a container
    #[must_use]
    pub fn in_container(&self) -> bool {
        self.docker_marker.exists()
    }

    /// Whether any CI/container detection signal is present.
    ///
    /// Signals: the generic `CI` flag, the `GITHUB_ACTIONS` vendor flag, a
    /// set `JENKINS_URL`, or the Docker marker file.
    #[must_use]
    pub fn is_ci(&self) -> bool {
        self.flag("CI")
            || self.flag("GITHUB_ACTIONS")
            || self.var("JENKINS_URL").is_some()
            || self.in_container()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::detect()
    }
}

/// Run configuration for a scenario suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Explicitly requested browser kind, if any (highest precedence)
    pub browser: Option<String>,
    /// Storefront base URL
    pub base_url: String,
    /// Implicit element-lookup timeout applied after session creation
    pub implicit_wait: Duration,
    /// Page-load timeout applied after session creation
    pub page_load_timeout: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            browser: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            implicit_wait: DEFAULT_IMPLICIT_WAIT,
            page_load_timeout: DEFAULT_PAGE_LOAD_TIMEOUT,
        }
    }
}

impl RunConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the explicit browser kind
    #[must_use]
    pub fn with_browser(mut self, kind: impl Into<String>) -> Self {
        self.browser = Some(kind.into());
        self
    }

    /// Set the storefront base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the implicit element-lookup timeout
    #[must_use]
    pub const fn with_implicit_wait(mut self, timeout: Duration) -> Self {
        self.implicit_wait = timeout;
        self
    }

    /// Set the page-load timeout
    #[must_use]
    pub const fn with_page_load_timeout(mut self, timeout: Duration) -> Self {
        self.page_load_timeout = timeout;
        self
    }
}
