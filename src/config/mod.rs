//! Configuration handling for the application.
//!
//! Everything is read from environment variables with development defaults,
//! so a bare `jobscout` invocation scans the sample file layout out of the
//! box. Keyword sets and marker tokens land in a [`ScanRules`] value that is
//! passed explicitly into each pipeline component; nothing reads ambient
//! state.

use std::collections::HashSet;
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::pipeline::ScanRules;

/// Environment variable names. Keeping them public lets tests and wrapper
/// scripts refer to them directly.
pub const ENV_TARGETS_FILE: &str = "TARGETS_FILE";
pub const ENV_OUTPUT_FILE: &str = "OUTPUT_FILE";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_RENDER_ENDPOINT: &str = "RENDER_ENDPOINT";
pub const ENV_TARGET_PAUSE_MS: &str = "TARGET_PAUSE_MS";
pub const ENV_ALLOW_LOCATIONS: &str = "ALLOW_LOCATIONS";
pub const ENV_DENY_LOCATIONS: &str = "DENY_LOCATIONS";
pub const ENV_KEY_MARKERS: &str = "KEY_MARKERS";

/// Default development values used when environment variables are absent.
const DEFAULT_TARGETS_FILE: &str = "job_sites.csv";
const DEFAULT_OUTPUT_FILE: &str = "found_jobs.csv";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TARGET_PAUSE_MS: u64 = 1000;

/// Location keywords that keep a posting. US metros plus Hong Kong.
const DEFAULT_ALLOW_LOCATIONS: &[&str] = &[
    "new york", "nyc", "ny", "los angeles", "la", "chicago", "san francisco", "sf",
    "boston", "houston", "dallas", "philadelphia", "atlanta", "washington dc", "dc",
    "seattle", "miami", "denver", "austin", "menlo park", "palo alto", "charlotte",
    "greenwich", "stamford", "irvine", "newport beach",
    "usa", "us", "united states", "hong kong", "hk",
];

/// Location keywords that drop a posting when no allow keyword matched.
/// Entries starting with `/` are matched as URL path segments (locale
/// prefixes like `/fr-fr`) rather than as words.
const DEFAULT_DENY_LOCATIONS: &[&str] = &[
    // Europe
    "london", "paris", "frankfurt", "milan", "zurich", "geneva", "madrid",
    "amsterdam", "dublin", "luxembourg", "brussels", "stockholm", "warsaw", "birmingham",
    "uk", "united kingdom", "great britain", "france", "germany", "italy",
    "spain", "switzerland", "ireland", "benelux", "nordics", "emea",
    // Asia-Pacific outside Hong Kong
    "singapore", "tokyo", "seoul", "mumbai", "delhi", "beijing", "shanghai",
    "shenzhen", "dubai", "riyadh", "tel aviv",
    "japan", "korea", "india", "china", "mainland", "australia", "asean", "mea", "israel",
    // Americas outside the US
    "toronto", "montreal", "vancouver", "canada", "mexico city", "sao paulo", "brazil", "latam",
    // Locale path segments
    "/fr-fr", "/de-de", "/it-it", "/ja-jp", "/ko-kr", "/es-es",
];

/// Path segments whose presence marks the start of a posting's descriptive
/// suffix. Order matters only for documentation; matching is by first
/// occurrence in the path.
const DEFAULT_KEY_MARKERS: &[&str] = &["opp", "job"];

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    targets_path: String,
    output_path: String,
    fetch_timeout_secs: u64,
    render_endpoint: Option<String>,
    target_pause_ms: u64,
    rules: ScanRules,
}

impl Config {
    /// Create a new config explicitly. Keyword sets default to the built-in
    /// lists; use [`Config::with_rules`] to replace them.
    pub fn new(targets_path: impl Into<String>, output_path: impl Into<String>) -> Self {
        Self {
            targets_path: targets_path.into(),
            output_path: output_path.into(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            render_endpoint: None,
            target_pause_ms: DEFAULT_TARGET_PAUSE_MS,
            rules: default_rules(),
        }
    }

    /// Replace the keyword/marker rules wholesale.
    pub fn with_rules(mut self, rules: ScanRules) -> Self {
        self.rules = rules;
        self
    }

    /// Load from environment variables, falling back to development defaults.
    ///
    /// Numeric variables that are present but unparsable are reported as a
    /// [`ConfigError`] rather than silently replaced.
    pub fn from_env() -> Result<Self, ConfigError> {
        let targets_path =
            env::var(ENV_TARGETS_FILE).unwrap_or_else(|_| DEFAULT_TARGETS_FILE.to_string());
        let output_path =
            env::var(ENV_OUTPUT_FILE).unwrap_or_else(|_| DEFAULT_OUTPUT_FILE.to_string());
        let fetch_timeout_secs =
            parse_env_u64(ENV_FETCH_TIMEOUT_SECS, DEFAULT_FETCH_TIMEOUT_SECS)?;
        let target_pause_ms = parse_env_u64(ENV_TARGET_PAUSE_MS, DEFAULT_TARGET_PAUSE_MS)?;
        let render_endpoint = env::var(ENV_RENDER_ENDPOINT)
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty());

        let allow_locations = env::var(ENV_ALLOW_LOCATIONS)
            .map(|raw| parse_keyword_set(&raw))
            .unwrap_or_else(|_| keyword_set(DEFAULT_ALLOW_LOCATIONS));
        let deny_locations = env::var(ENV_DENY_LOCATIONS)
            .map(|raw| parse_keyword_set(&raw))
            .unwrap_or_else(|_| keyword_set(DEFAULT_DENY_LOCATIONS));
        let markers = env::var(ENV_KEY_MARKERS)
            .map(|raw| parse_keyword_list(&raw))
            .unwrap_or_else(|_| keyword_list(DEFAULT_KEY_MARKERS));

        Ok(Self {
            targets_path,
            output_path,
            fetch_timeout_secs,
            render_endpoint,
            target_pause_ms,
            rules: ScanRules {
                allow_locations,
                deny_locations,
                markers,
            },
        })
    }

    /// Path of the CSV file listing target career-page URLs.
    pub fn targets_path(&self) -> &str {
        &self.targets_path
    }
    /// Path of the CSV file holding discovered postings.
    pub fn output_path(&self) -> &str {
        &self.output_path
    }
    /// Per-request fetch timeout.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
    /// Optional base URL of a Browserless-style rendering service.
    pub fn render_endpoint(&self) -> Option<&str> {
        self.render_endpoint.as_deref()
    }
    /// Pause between consecutive targets.
    pub fn target_pause(&self) -> Duration {
        Duration::from_millis(self.target_pause_ms)
    }
    /// Keyword and marker configuration for the pipeline components.
    pub fn rules(&self) -> &ScanRules {
        &self.rules
    }
}

/// The built-in keyword/marker rules, also used when the env is silent.
pub fn default_rules() -> ScanRules {
    ScanRules {
        allow_locations: keyword_set(DEFAULT_ALLOW_LOCATIONS),
        deny_locations: keyword_set(DEFAULT_DENY_LOCATIONS),
        markers: keyword_list(DEFAULT_KEY_MARKERS),
    }
}

fn parse_env_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field: name,
            reason: format!("expected an integer, got '{}'", raw),
        }),
    }
}

/// Comma-separated keywords, trimmed and case-folded. Empty entries vanish.
fn parse_keyword_set(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// As [`parse_keyword_set`] but order-preserving, for marker tokens.
fn parse_keyword_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn keyword_set(defaults: &[&str]) -> HashSet<String> {
    defaults.iter().map(|k| k.to_string()).collect()
}

fn keyword_list(defaults: &[&str]) -> Vec<String> {
    defaults.iter().map(|k| k.to_string()).collect()
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
