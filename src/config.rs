use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{env, fs, path};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the backend serving `/api/v1/posts/counts`.
    pub api_base_url: String,
    #[serde(default = "redis_addr_default")]
    pub redis_addr: String,
    #[serde(default = "log_level_default")]
    pub log_level: String,
    #[serde(default = "health_check_port_default")]
    pub health_check_port: u16,
    #[serde(default = "intake_port_default")]
    pub intake_port: u16,
    #[serde(default = "poll_interval_secs_default")]
    pub poll_interval_secs: u64,
}

impl Config {
    fn get_config_dir() -> anyhow::Result<path::PathBuf> {
        let config_dir = if let Ok(xdg_path) = env::var("XDG_CONFIG_HOME") {
            path::PathBuf::from(&xdg_path)
        } else {
            path::Path::new(&env::var("HOME").unwrap()).join(".config")
        };

        let dir = config_dir.join("badge_sync");

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        Ok(dir)
    }

    pub fn from_path() -> anyhow::Result<Self> {
        let file_path = if let Ok(cfg_path) = env::var("BADGE_SYNC_CFG_PATH") {
            path::PathBuf::from(cfg_path)
        } else {
            Self::get_config_dir()
                .with_context(|| "fail to open config directory")?
                .join("config.toml")
        };

        if !file_path.exists() {
            anyhow::bail!("Config file not found in {file_path:?}");
        }
        let content = fs::read_to_string(file_path).with_context(|| "fail to read config file")?;

        toml::from_str(&content).with_context(|| "fail to parse config from toml")
    }
}

fn redis_addr_default() -> String {
    "redis://localhost:6379".to_string()
}

fn log_level_default() -> String {
    "INFO".to_string()
}

fn health_check_port_default() -> u16 {
    11452
}

fn intake_port_default() -> u16 {
    11453
}

fn poll_interval_secs_default() -> u64 {
    30
}

#[test]
fn validate_file_correctness() {
    let dir = tempfile::tempdir().unwrap();
    let config = r#"
        api_base_url = "https://backend.example"
        redis_addr = "redis://localhost"
        poll_interval_secs = 15
    "#;
    let path = dir.path().join("config.toml");
    std::fs::write(&path, config).unwrap();
    env::set_var("BADGE_SYNC_CFG_PATH", &path);

    let config = Config::from_path().unwrap();
    assert_eq!(config.api_base_url, "https://backend.example");
    assert_eq!(config.poll_interval_secs, 15);
    // Defaults fill in everything left out.
    assert_eq!(config.log_level, "INFO");
    assert_eq!(config.intake_port, 11453);
}
