//! Session configuration.
//!
//! Settings are an explicit [`SessionConfig`] value handed to fixtures and
//! pages. They can be written in YAML and overridden from the environment:
//!
//! ```yaml
//! browser: firefox
//! mode: reuse
//! base_url: http://localhost:8080
//! hub_uri: http://grid.local:4444/wd/hub
//! wait:
//!   timeout_ms: 5000
//! ```

use crate::result::{PagewaitError, PagewaitResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Overrides [`SessionConfig::base_url`]
pub const ENV_BASE_URL: &str = "PAGEWAIT_BASE_URL";
/// Overrides [`SessionConfig::browser`]
pub const ENV_BROWSER: &str = "PAGEWAIT_BROWSER";
/// Overrides [`SessionConfig::mode`]
pub const ENV_BROWSER_MODE: &str = "PAGEWAIT_BROWSER_MODE";
/// Overrides [`SessionConfig::hub_uri`]
pub const ENV_HUB_URI: &str = "PAGEWAIT_HUB_URI";

/// Default WebDriver command timeout (3 minutes)
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 180_000;

/// Document loaded when a session starts or is handed to the next test
pub const DEFAULT_INITIAL_URL: &str = "about:blank";

/// Browser to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserKind {
    /// Google Chrome
    #[default]
    Chrome,
    /// Mozilla Firefox
    Firefox,
    /// Microsoft Edge
    Edge,
    /// Apple Safari
    Safari,
    /// Internet Explorer
    InternetExplorer,
}

impl BrowserKind {
    /// Name as written in configuration
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Edge => "edge",
            Self::Safari => "safari",
            Self::InternetExplorer => "internet_explorer",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = PagewaitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "firefox" => Ok(Self::Firefox),
            "edge" => Ok(Self::Edge),
            "safari" => Ok(Self::Safari),
            "internet_explorer" | "internetexplorer" | "ie" => Ok(Self::InternetExplorer),
            other => Err(PagewaitError::config(format!("unknown browser '{other}'"))),
        }
    }
}

/// Whether each test gets a fresh browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserMode {
    /// Quit and start a new session for every test
    #[default]
    New,
    /// Keep one session and reset it to the initial URL between tests
    Reuse,
}

impl fmt::Display for BrowserMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::New => "new",
            Self::Reuse => "reuse",
        })
    }
}

impl FromStr for BrowserMode {
    type Err = PagewaitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Self::New),
            "reuse" => Ok(Self::Reuse),
            other => Err(PagewaitError::config(format!("unknown browser mode '{other}'"))),
        }
    }
}

/// Everything a fixture needs to open a session and build pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Browser to drive
    pub browser: BrowserKind,
    /// Fresh or reused sessions
    pub mode: BrowserMode,
    /// Site root; always ends with `/`
    pub base_url: String,
    /// Remote hub; `None` runs locally
    pub hub_uri: Option<String>,
    /// Requested browser version on a grid
    pub browser_version: Option<String>,
    /// Requested platform on a grid
    pub platform: Option<String>,
    /// Driver command timeout in milliseconds
    pub command_timeout_ms: u64,
    /// Where the browser saves downloads
    pub download_dir: Option<PathBuf>,
    /// URL loaded at session start and between reused tests
    pub initial_url: String,
    /// Defaults for waits started by tests
    pub wait: WaitOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            browser: BrowserKind::default(),
            mode: BrowserMode::default(),
            base_url: String::new(),
            hub_uri: None,
            browser_version: None,
            platform: None,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            download_dir: None,
            initial_url: DEFAULT_INITIAL_URL.to_string(),
            wait: WaitOptions::default(),
        }
    }
}

fn with_trailing_slash(url: &str) -> String {
    if url.is_empty() || url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl SessionConfig {
    /// Defaults with the given base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Parse YAML.
    ///
    /// # Errors
    ///
    /// YAML errors.
    pub fn from_yaml_str(yaml: &str) -> PagewaitResult<Self> {
        let mut config: Self = serde_yaml_ng::from_str(yaml)?;
        config.base_url = with_trailing_slash(&config.base_url);
        Ok(config)
    }

    /// Parse JSON, the form remote grids echo back.
    ///
    /// # Errors
    ///
    /// JSON errors.
    pub fn from_json_str(json: &str) -> PagewaitResult<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        config.base_url = with_trailing_slash(&config.base_url);
        Ok(config)
    }

    /// Render as pretty JSON for logs and reports.
    ///
    /// # Errors
    ///
    /// JSON errors.
    pub fn to_json(&self) -> PagewaitResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read and parse a YAML file.
    ///
    /// # Errors
    ///
    /// I/O or YAML errors.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> PagewaitResult<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading session config");
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    /// Apply `PAGEWAIT_*` environment overrides.
    ///
    /// # Errors
    ///
    /// [`PagewaitError::Config`] for unparseable values.
    pub fn with_env_overrides(self) -> PagewaitResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the environment, in practice).
    ///
    /// # Errors
    ///
    /// [`PagewaitError::Config`] for unparseable values.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> PagewaitResult<Self> {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = with_trailing_slash(&url);
        }
        if let Some(browser) = lookup(ENV_BROWSER) {
            self.browser = browser.parse()?;
        }
        if let Some(mode) = lookup(ENV_BROWSER_MODE) {
            self.mode = mode.parse()?;
        }
        if let Some(hub) = lookup(ENV_HUB_URI) {
            self.hub_uri = (!hub.is_empty()).then_some(hub);
        }
        Ok(self)
    }

    /// Set the base URL (a trailing `/` is added)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = with_trailing_slash(&base_url.into());
        self
    }

    /// Set the browser
    #[must_use]
    pub const fn with_browser(mut self, browser: BrowserKind) -> Self {
        self.browser = browser;
        self
    }

    /// Set the browser mode
    #[must_use]
    pub const fn with_mode(mut self, mode: BrowserMode) -> Self {
        self.mode = mode;
        self
    }

    /// Run against a remote hub
    #[must_use]
    pub fn with_hub_uri(mut self, hub_uri: impl Into<String>) -> Self {
        self.hub_uri = Some(hub_uri.into());
        self
    }

    /// Set the URL loaded between tests
    #[must_use]
    pub fn with_initial_url(mut self, url: impl Into<String>) -> Self {
        self.initial_url = url.into();
        self
    }

    /// Set default wait options
    #[must_use]
    pub fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Whether sessions run on a remote hub
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.hub_uri.is_some()
    }

    /// Check the configuration is usable.
    ///
    /// # Errors
    ///
    /// [`PagewaitError::Config`] naming the first problem found.
    pub fn validate(&self) -> PagewaitResult<()> {
        if !is_http_url(&self.base_url) {
            return Err(PagewaitError::config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if let Some(hub) = &self.hub_uri {
            if !is_http_url(hub) {
                return Err(PagewaitError::config(format!(
                    "hub_uri must be an http(s) URL, got '{hub}'"
                )));
            }
        }
        if self.command_timeout_ms == 0 {
            return Err(PagewaitError::config("command_timeout_ms must be positive"));
        }
        if self.initial_url.is_empty() {
            return Err(PagewaitError::config("initial_url must not be empty"));
        }
        if self.wait.poll_interval_ms == 0 {
            return Err(PagewaitError::config("wait.poll_interval_ms must be positive"));
        }
        Ok(())
    }
}
