use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/companies.json";
const DEFAULT_COMPANY: &str = "005930";

/// Settings read once from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub data_path: PathBuf,
    /// Stock code shown when no company is requested or a search fails.
    pub default_company: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            default_company: DEFAULT_COMPANY.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);
        let data_path = lookup("APP_DATA_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);
        let default_company = lookup("EWS_DEFAULT_COMPANY")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.default_company);

        Self {
            port,
            data_path,
            default_company,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn falls_back_to_defaults() {
        assert_eq!(config(&[]), AppConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let cfg = config(&[
            ("PORT", "9000"),
            ("APP_DATA_PATH", "/tmp/ews.json"),
            ("EWS_DEFAULT_COMPANY", " 000660 "),
        ]);
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.data_path, PathBuf::from("/tmp/ews.json"));
        assert_eq!(cfg.default_company, "000660");
    }

    #[test]
    fn bad_port_uses_default() {
        assert_eq!(config(&[("PORT", "http")]).port, DEFAULT_PORT);
    }
}
