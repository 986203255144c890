use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{ReconcileSettings, SearchBar, SearchVariant};
use crate::models::{FilterMode, FitOptions};
use crate::services::{GeocodingService, LocationAutocomplete};
use crate::session::SessionSettings;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub proxy: ProxySettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub filter: FilterSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct ProxySettings {
    #[serde(default = "default_proxy_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_proxy_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            endpoint: default_proxy_endpoint(),
            timeout_secs: default_proxy_timeout_secs(),
        }
    }
}

fn default_proxy_endpoint() -> String { "http://localhost:3000".to_string() }
fn default_proxy_timeout_secs() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_radius_miles")]
    pub radius_miles: f64,
    #[serde(default = "default_fallback_limit")]
    pub fallback_limit: usize,
    #[serde(default = "default_fallback_max_zoom")]
    pub fallback_max_zoom: u8,
    #[serde(default = "default_fallback_padding_px")]
    pub fallback_padding_px: u32,
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: u8,
    #[serde(default = "default_map_ready_timeout_ms")]
    pub map_ready_timeout_ms: u64,
    #[serde(default = "default_suggestion_debounce_ms")]
    pub suggestion_debounce_ms: u64,
    #[serde(default = "default_suggestion_min_chars")]
    pub suggestion_min_chars: usize,
    #[serde(default = "default_guests")]
    pub default_guests: u8,
    #[serde(default = "default_max_guests")]
    pub max_guests: u8,
    #[serde(default = "default_error_display_secs")]
    pub error_display_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            radius_miles: default_radius_miles(),
            fallback_limit: default_fallback_limit(),
            fallback_max_zoom: default_fallback_max_zoom(),
            fallback_padding_px: default_fallback_padding_px(),
            initial_zoom: default_initial_zoom(),
            map_ready_timeout_ms: default_map_ready_timeout_ms(),
            suggestion_debounce_ms: default_suggestion_debounce_ms(),
            suggestion_min_chars: default_suggestion_min_chars(),
            default_guests: default_guests(),
            max_guests: default_max_guests(),
            error_display_secs: default_error_display_secs(),
        }
    }
}

fn default_radius_miles() -> f64 { 30.0 }
fn default_fallback_limit() -> usize { 10 }
fn default_fallback_max_zoom() -> u8 { 11 }
fn default_fallback_padding_px() -> u32 { 50 }
fn default_initial_zoom() -> u8 { 10 }
fn default_map_ready_timeout_ms() -> u64 { 10_000 }
fn default_suggestion_debounce_ms() -> u64 { 300 }
fn default_suggestion_min_chars() -> usize { 3 }
fn default_guests() -> u8 { 2 }
fn default_max_guests() -> u8 { 30 }
fn default_error_display_secs() -> u64 { 3 }

impl SearchSettings {
    pub fn reconcile_settings(&self) -> ReconcileSettings {
        ReconcileSettings {
            fallback_limit: self.fallback_limit,
            fallback_fit: FitOptions {
                padding_px: self.fallback_padding_px,
                max_zoom: self.fallback_max_zoom,
            },
        }
    }

    pub fn suggestion_debounce(&self) -> Duration {
        Duration::from_millis(self.suggestion_debounce_ms)
    }

    pub fn error_display(&self) -> Duration {
        Duration::from_secs(self.error_display_secs)
    }

    /// Empty search bar with the configured guest defaults
    pub fn search_bar(&self, variant: SearchVariant) -> SearchBar {
        SearchBar::new(variant, self.default_guests, self.max_guests)
    }

    /// Location autocomplete with the configured debounce and minimum length
    pub fn location_autocomplete<G>(&self, geocoder: Arc<G>) -> LocationAutocomplete<G>
    where
        G: GeocodingService + 'static,
    {
        LocationAutocomplete::new(geocoder, self.suggestion_debounce(), self.suggestion_min_chars)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterSettings {
    #[serde(default)]
    pub mode: FilterMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            max_entries: default_cache_max_entries(),
        }
    }
}

fn default_cache_ttl_secs() -> u64 { 300 }
fn default_cache_max_entries() -> u64 { 1000 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with STAYFILTER__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Development overrides
            .add_source(File::with_name("config/local").required(false))
            // e.g., STAYFILTER__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("STAYFILTER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("STAYFILTER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Session tunables derived from the search and filter sections
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            radius_miles: self.search.radius_miles,
            reconcile: self.search.reconcile_settings(),
            initial_zoom: self.search.initial_zoom,
            map_ready_timeout: Duration::from_millis(self.search.map_ready_timeout_ms),
            mode: self.filter.mode,
            center_on_origin: true,
        }
    }
}

/// Apply well-known environment overrides on top of the layered config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = std::env::var("PROXY_URL") {
        builder = builder.set_override("proxy.endpoint", url)?;
    }

    builder.build()
}
