use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path, path::PathBuf, time::Duration};

pub const DEFAULT_BASE_URL: &str = "https://www.jma.go.jp/bosai/forecast/data/forecast";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60 * 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

/// Major cities. Sapporo and Naha use their prefecture-level codes.
pub const DEFAULT_AREA_CODES: &[&str] = &[
    "130000", // Tokyo
    "270000", // Osaka
    "016000", // Sapporo
    "040000", // Sendai
    "230000", // Nagoya
    "330000", // Okayama
    "400000", // Fukuoka
    "471000", // Naha
];

/// `<base_url>/<area_code>.json`
pub fn area_url(base_url: &str, area_code: &str) -> String {
    format!("{}/{}.json", base_url.trim_end_matches('/'), area_code)
}

/// Service configuration stored on disk as TOML.
///
/// Example:
/// ```toml
/// area_codes = ["130000", "270000"]
/// refresh_interval_secs = 3600
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Areas to poll. Output keeps this order.
    pub area_codes: Vec<String>,
    pub base_url: String,
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Address the HTTP API binds to.
    pub listen: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            area_codes: DEFAULT_AREA_CODES.iter().map(|c| c.to_string()).collect(),
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

impl Config {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn area_url(&self, area_code: &str) -> String {
        area_url(&self.base_url, area_code)
    }

    pub fn validate(&self) -> Result<()> {
        if self.area_codes.is_empty() {
            bail!("No area codes configured");
        }

        let mut seen = HashSet::new();
        for code in &self.area_codes {
            if code.trim().is_empty() {
                bail!("Area codes must not be blank");
            }
            if !seen.insert(code.as_str()) {
                bail!("Area code '{code}' is configured more than once");
            }
        }

        if self.refresh_interval_secs == 0 {
            bail!("refresh_interval_secs must be greater than zero");
        }

        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Load config from the default location, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_major_cities() {
        let cfg = Config::default();

        assert_eq!(cfg.area_codes.len(), 8);
        assert_eq!(cfg.area_codes[0], "130000");
        assert_eq!(cfg.area_codes[7], "471000");
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(3600));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn area_url_joins_base_and_code() {
        let cfg = Config { base_url: "http://localhost:9000/forecast/".into(), ..Config::default() };

        assert_eq!(cfg.area_url("016000"), "http://localhost:9000/forecast/016000.json");
        assert_eq!(
            Config::default().area_url("130000"),
            "https://www.jma.go.jp/bosai/forecast/data/forecast/130000.json"
        );
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "area_codes = [\"400000\", \"130000\"]\nrefresh_interval_secs = 600\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();

        assert_eq!(cfg.area_codes, vec!["400000", "130000"]);
        assert_eq!(cfg.refresh_interval_secs, 600);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.listen, DEFAULT_LISTEN);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config { listen: "127.0.0.1:3000".into(), ..Config::default() };

        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn invalid_toml_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "area_codes = 13").unwrap();

        let err = Config::load_from(&path).unwrap_err();

        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn validate_rejects_bad_area_lists() {
        let empty = Config { area_codes: vec![], ..Config::default() };
        assert!(empty.validate().unwrap_err().to_string().contains("No area codes"));

        let dup = Config { area_codes: vec!["130000".into(), "130000".into()], ..Config::default() };
        assert!(dup.validate().unwrap_err().to_string().contains("more than once"));

        let blank = Config { area_codes: vec![" ".into()], ..Config::default() };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let cfg = Config { refresh_interval_secs: 0, ..Config::default() };

        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let cfg = Config { request_timeout_secs: 0, ..Config::default() };

        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_secs"));
    }
}
