use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path, time::Duration};

pub const DEFAULT_TABLE: &str = "todolist";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default, with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

pub fn parse_config(contents: &str) -> Result<Config, Box<dyn std::error::Error>> {
    serde_yaml::from_str(contents).map_err(Into::into)
}

fn load_from_file(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Builds a config from variables looked up through `var`.
pub fn load_from_vars<F>(var: F) -> Result<Config, Box<dyn std::error::Error>>
where
    F: Fn(&str) -> Option<String>,
{
    let store = StoreConfig {
        url: var("SUPABASE_URL").ok_or("SUPABASE_URL environment variable is required")?,
        api_key: var("SUPABASE_ANON_KEY")
            .ok_or("SUPABASE_ANON_KEY environment variable is required")?,
        table: var("TODOLIST_TABLE").unwrap_or_else(default_table),
    };

    let request_timeout = var("TODOLIST_TIMEOUT")
        .map(|raw| {
            humantime_serde::re::humantime::parse_duration(&raw)
                .map_err(|e| format!("Failed to parse TODOLIST_TIMEOUT: {e}"))
        })
        .transpose()?;

    Ok(Config {
        store,
        request_timeout,
    })
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    // Retrieve env variable
    let config_path = env::var("TODOLIST_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        return load_from_file(&config_path);
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return load_from_file("config.yaml");
    }

    // Fallback to config.example.yaml
    if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}' and 'config.yaml' not found, falling back to 'config.example.yaml'\
             \n This file should not be used and should be replaced with actual data",
            config_path
        );
        return load_from_file("config.example.yaml");
    }

    // Fallback to environment variables
    tracing::info!(
        "No config file found, attempting to load configuration from environment variables"
    );
    match load_from_vars(|key| env::var(key).ok()) {
        Ok(config) => {
            tracing::info!("Successfully loaded configuration from environment variables");
            Ok(config)
        }
        Err(e) => Err(format!(
            "Config file not found and environment variables are incomplete. \
             Tried: '{config_path}', 'config.yaml', 'config.example.yaml', and environment variables. \
             Error: {e}"
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn yaml_with_all_fields() {
        let cfg = parse_config(
            "store:\n  url: https://abc.supabase.co\n  api_key: anon\n  table: todos\nrequest_timeout: 5s\n",
        )
        .unwrap();

        assert_eq!(cfg.store.url, "https://abc.supabase.co");
        assert_eq!(cfg.store.api_key, "anon");
        assert_eq!(cfg.store.table, "todos");
        assert_eq!(cfg.request_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn yaml_defaults_table_and_leaves_timeout_unset() {
        let cfg = parse_config("store:\n  url: http://localhost:54321\n  api_key: k\n").unwrap();

        assert_eq!(cfg.store.table, DEFAULT_TABLE);
        assert_eq!(cfg.request_timeout, None);
    }

    #[test]
    fn yaml_without_key_is_rejected() {
        assert!(parse_config("store:\n  url: http://localhost\n").is_err());
    }

    #[test]
    fn vars_build_config() {
        let cfg = load_from_vars(vars(&[
            ("SUPABASE_URL", "http://localhost:54321"),
            ("SUPABASE_ANON_KEY", "secret"),
            ("TODOLIST_TIMEOUT", "1m 30s"),
        ]))
        .unwrap();

        assert_eq!(cfg.store.table, DEFAULT_TABLE);
        assert_eq!(cfg.request_timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn vars_missing_url_names_the_variable() {
        let err = load_from_vars(vars(&[("SUPABASE_ANON_KEY", "secret")])).unwrap_err();
        assert!(err.to_string().contains("SUPABASE_URL"));
    }

    #[test]
    fn vars_bad_timeout_is_rejected() {
        let err = load_from_vars(vars(&[
            ("SUPABASE_URL", "http://localhost"),
            ("SUPABASE_ANON_KEY", "secret"),
            ("TODOLIST_TIMEOUT", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("TODOLIST_TIMEOUT"));
    }
}
