//! Configuration file management for fitcraft.
//!
//! Provides a TOML-based config file at `~/.config/fitcraft/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.
//!
//! The model API key is never stored here; it is read from `OPENAI_API_KEY`
//! when a command needs the model.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use fitcraft_core::catalog::{DEFAULT_ASSET_BASE_URL, DEFAULT_CATALOG_URL};
use fitcraft_core::model::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use fitcraft_core::reconcile::{DEFAULT_MATCH_THRESHOLD, ReconcileOptions};

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

const ENV_MODEL_BASE_URL: &str = "FITCRAFT_MODEL_BASE_URL";
const ENV_MODEL: &str = "FITCRAFT_MODEL";
const ENV_CATALOG_URL: &str = "FITCRAFT_CATALOG_URL";
const ENV_ASSET_BASE_URL: &str = "FITCRAFT_ASSET_BASE_URL";
const ENV_MATCH_THRESHOLD: &str = "FITCRAFT_MATCH_THRESHOLD";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub model: ModelSection,
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub reconcile: ReconcileSection,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ModelSection {
    pub base_url: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CatalogSection {
    pub url: Option<String>,
    pub asset_base_url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReconcileSection {
    /// Minimum similarity in `[0, 1]` for a catalog match.
    pub threshold: Option<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub port: Option<u16>,
}

impl ConfigFile {
    /// Config file with every value set to its default.
    pub fn with_defaults() -> Self {
        Self {
            model: ModelSection {
                base_url: Some(DEFAULT_BASE_URL.to_string()),
                name: Some(DEFAULT_MODEL.to_string()),
            },
            catalog: CatalogSection {
                url: Some(DEFAULT_CATALOG_URL.to_string()),
                asset_base_url: Some(DEFAULT_ASSET_BASE_URL.to_string()),
            },
            reconcile: ReconcileSection {
                threshold: Some(DEFAULT_MATCH_THRESHOLD),
            },
            server: ServerSection {
                bind: Some(DEFAULT_BIND.to_string()),
                port: Some(DEFAULT_PORT),
            },
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the fitcraft config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/fitcraft` or
/// `~/.config/fitcraft`, also on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("fitcraft");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("fitcraft")
}

/// Return the path to the fitcraft config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub model_base_url: Option<String>,
    pub model: Option<String>,
    pub catalog_url: Option<String>,
    pub asset_base_url: Option<String>,
    pub threshold: Option<f64>,
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone)]
pub struct FitcraftConfig {
    pub model_base_url: String,
    pub model: String,
    pub catalog_url: String,
    pub asset_base_url: String,
    pub reconcile: ReconcileOptions,
    pub bind: String,
    pub port: u16,
}

impl FitcraftConfig {
    /// Resolve using the config file at [`config_path`], if present.
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let path = config_path();
        let file = if path.exists() {
            Some(load_config()?)
        } else {
            None
        };
        Self::resolve_with(overrides, file.as_ref())
    }

    /// Resolve with the chain: CLI flag > env var > config file > default.
    pub fn resolve_with(overrides: &Overrides, file: Option<&ConfigFile>) -> Result<Self> {
        let model_base_url = pick(
            overrides.model_base_url.clone(),
            ENV_MODEL_BASE_URL,
            file.and_then(|f| f.model.base_url.clone()),
            DEFAULT_BASE_URL,
        );
        let model = pick(
            overrides.model.clone(),
            ENV_MODEL,
            file.and_then(|f| f.model.name.clone()),
            DEFAULT_MODEL,
        );
        let catalog_url = pick(
            overrides.catalog_url.clone(),
            ENV_CATALOG_URL,
            file.and_then(|f| f.catalog.url.clone()),
            DEFAULT_CATALOG_URL,
        );
        let asset_base_url = pick(
            overrides.asset_base_url.clone(),
            ENV_ASSET_BASE_URL,
            file.and_then(|f| f.catalog.asset_base_url.clone()),
            DEFAULT_ASSET_BASE_URL,
        );

        let threshold = if let Some(t) = overrides.threshold {
            t
        } else if let Ok(raw) = std::env::var(ENV_MATCH_THRESHOLD) {
            raw.trim()
                .parse::<f64>()
                .with_context(|| format!("{ENV_MATCH_THRESHOLD} is not a number: {raw:?}"))?
        } else if let Some(t) = file.and_then(|f| f.reconcile.threshold) {
            t
        } else {
            DEFAULT_MATCH_THRESHOLD
        };
        let reconcile = ReconcileOptions::with_threshold(threshold)?;

        let bind = overrides
            .bind
            .clone()
            .or_else(|| file.and_then(|f| f.server.bind.clone()))
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let port = overrides
            .port
            .or_else(|| file.and_then(|f| f.server.port))
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            model_base_url,
            model,
            catalog_url,
            asset_base_url,
            reconcile,
            bind,
            port,
        })
    }
}

fn pick(cli: Option<String>, env: &str, file: Option<String>, default: &str) -> String {
    cli.or_else(|| std::env::var(env).ok().filter(|v| !v.is_empty()))
        .or(file)
        .unwrap_or_else(|| default.to_string())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    fn clear_env() {
        for var in [
            ENV_MODEL_BASE_URL,
            ENV_MODEL,
            ENV_CATALOG_URL,
            ENV_ASSET_BASE_URL,
            ENV_MATCH_THRESHOLD,
        ] {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    fn defaults_when_nothing_set() {
        let _lock = lock_env();
        clear_env();

        let config = FitcraftConfig::resolve_with(&Overrides::default(), None).unwrap();
        assert_eq!(config.model_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.asset_base_url, DEFAULT_ASSET_BASE_URL);
        assert_eq!(config.reconcile.threshold(), 0.6);
        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn file_overrides_defaults() {
        let _lock = lock_env();
        clear_env();

        let file: ConfigFile = toml::from_str(
            r#"
            [model]
            name = "gpt-4o-mini"

            [reconcile]
            threshold = 0.75

            [server]
            port = 8080
            "#,
        )
        .unwrap();
        let config = FitcraftConfig::resolve_with(&Overrides::default(), Some(&file)).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.reconcile.threshold(), 0.75);
        assert_eq!(config.port, 8080);
        assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
    }

    #[test]
    fn env_var_overrides_config_file() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var(ENV_MODEL, "env-model") };
        unsafe { std::env::set_var(ENV_MATCH_THRESHOLD, "0.8") };

        let mut file = ConfigFile::with_defaults();
        file.model.name = Some("file-model".to_string());
        let result = FitcraftConfig::resolve_with(&Overrides::default(), Some(&file));
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.model, "env-model");
        assert_eq!(config.reconcile.threshold(), 0.8);
    }

    #[test]
    fn cli_flag_overrides_all() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var(ENV_CATALOG_URL, "http://env/catalog.json") };

        let overrides = Overrides {
            catalog_url: Some("http://cli/catalog.json".to_string()),
            threshold: Some(0.5),
            port: Some(9000),
            ..Overrides::default()
        };
        let result = FitcraftConfig::resolve_with(&overrides, Some(&ConfigFile::with_defaults()));
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.catalog_url, "http://cli/catalog.json");
        assert_eq!(config.reconcile.threshold(), 0.5);
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        let _lock = lock_env();
        clear_env();

        let overrides = Overrides {
            threshold: Some(1.2),
            ..Overrides::default()
        };
        let err = FitcraftConfig::resolve_with(&overrides, None).unwrap_err();
        assert!(err.to_string().contains("between 0 and 1"), "got: {err}");
    }

    #[test]
    fn threshold_env_must_be_numeric() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var(ENV_MATCH_THRESHOLD, "alto") };

        let result = FitcraftConfig::resolve_with(&Overrides::default(), None);
        clear_env();

        let msg = result.unwrap_err().to_string();
        assert!(msg.contains(ENV_MATCH_THRESHOLD), "unexpected error: {msg}");
    }

    #[test]
    fn default_file_roundtrips_through_toml() {
        let contents = toml::to_string_pretty(&ConfigFile::with_defaults()).unwrap();
        assert!(!contents.contains("api_key"));
        let loaded: ConfigFile = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.model.name.as_deref(), Some(DEFAULT_MODEL));
        assert_eq!(loaded.reconcile.threshold, Some(DEFAULT_MATCH_THRESHOLD));
        assert_eq!(loaded.server.port, Some(DEFAULT_PORT));
    }

    #[test]
    fn empty_file_is_valid() {
        let loaded: ConfigFile = toml::from_str("").unwrap();
        assert!(loaded.model.name.is_none());
    }

    #[test]
    fn save_config_writes_under_xdg_dir() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };

        let saved = save_config(&ConfigFile::with_defaults());
        let loaded = load_config();
        let path = config_path();

        match orig_xdg {
            Some(x) => unsafe { std::env::set_var("XDG_CONFIG_HOME", x) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }

        saved.unwrap();
        assert_eq!(loaded.unwrap().catalog.url.as_deref(), Some(DEFAULT_CATALOG_URL));
        assert!(path.starts_with(tmp.path()));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let meta = std::fs::metadata(&path).unwrap();
            assert_eq!(meta.permissions().mode() & 0o777, 0o600);
        }
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("fitcraft/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
