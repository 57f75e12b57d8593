use std::path::Path;

use config::{Config, ConfigError, Environment, Map};
use serde::{Deserialize, Serialize};

use crate::constants::DOTENV_PATH;
use crate::devices::SerialDeviceIdentifier;

/// Process-wide settings, read once from the environment at startup.
///
/// Every field has a default, so an empty environment still yields a usable
/// configuration. Variable names are the upper-cased field names, without a
/// prefix (`BACK_APP_API_URL`, `BARCODE_SERIAL_PORT`, ...). A `.env` file in the
/// working directory supplies values the process environment does not set.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScannerConfig {
    // Backend
    /// Scheme and host of the ticket backend, without a trailing slash.
    #[serde(default = "default_back_app_api_url")]
    pub back_app_api_url: String,

    #[serde(default = "default_back_app_api_port")]
    pub back_app_api_port: u16,

    /// Path of the ticket endpoint, without a leading slash.
    #[serde(default = "default_back_app_api_endpoint")]
    pub back_app_api_endpoint: String,

    // Scanner
    #[serde(default = "default_barcode_serial_port")]
    pub barcode_serial_port: String,

    #[serde(default = "default_barcode_serial_baudrate")]
    pub barcode_serial_baudrate: u32,

    // Ticket metadata
    #[serde(default = "default_ticket_type")]
    pub ticket_type: String,

    #[serde(default = "default_ticket_tariff_class")]
    pub ticket_tariff_class: i64,

    // Logging
    /// Emit stdout logs as JSON lines instead of plain text.
    #[serde(default)]
    pub log_json: bool,
}

fn default_back_app_api_url() -> String {
    // No trailing slash: `api_url` appends `:{port}` directly to this.
    "http://127.0.0.1".to_string()
}

fn default_back_app_api_port() -> u16 {
    8000
}

fn default_back_app_api_endpoint() -> String {
    "consult_ticket".to_string()
}

fn default_barcode_serial_port() -> String {
    "/dev/scanner".to_string()
}

fn default_barcode_serial_baudrate() -> u32 {
    115_200
}

fn default_ticket_type() -> String {
    "barcode".to_string()
}

fn default_ticket_tariff_class() -> i64 {
    0
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            back_app_api_url: default_back_app_api_url(),
            back_app_api_port: default_back_app_api_port(),
            back_app_api_endpoint: default_back_app_api_endpoint(),
            barcode_serial_port: default_barcode_serial_port(),
            barcode_serial_baudrate: default_barcode_serial_baudrate(),
            ticket_type: default_ticket_type(),
            ticket_tariff_class: default_ticket_tariff_class(),
            log_json: false,
        }
    }
}

impl ScannerConfig {
    /// Load from the process environment, falling back to `.env` and then to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(Path::new(DOTENV_PATH), std::env::vars())
    }

    fn from_vars(
        dotenv_path: &Path,
        process_vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, ConfigError> {
        let mut vars = read_dotenv(dotenv_path)?;
        // Process environment wins over the file.
        vars.extend(process_vars);
        Self::from_source(Environment::default().source(Some(vars)))
    }

    fn from_source(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// Target of every ticket submission. The parts are joined verbatim as
    /// `{url}:{port}/{endpoint}`.
    pub fn api_url(&self) -> String {
        format!(
            "{}:{}/{}",
            self.back_app_api_url, self.back_app_api_port, self.back_app_api_endpoint
        )
    }

    pub fn serial_device(&self) -> SerialDeviceIdentifier {
        SerialDeviceIdentifier {
            path: self.barcode_serial_port.clone(),
            baud_rate: self.barcode_serial_baudrate,
        }
    }
}

/// Variables from a dotenv file. A missing file is an empty set.
fn read_dotenv(path: &Path) -> Result<Map<String, String>, ConfigError> {
    match dotenvy::from_path_iter(path) {
        Ok(entries) => entries
            .collect::<Result<Map<_, _>, _>>()
            .map_err(|e| ConfigError::Foreign(Box::new(e))),
        Err(e) if e.not_found() => Ok(Map::new()),
        Err(e) => Err(ConfigError::Foreign(Box::new(e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;

    fn config_from(vars: &[(&str, &str)]) -> Result<ScannerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ScannerConfig::from_source(Environment::default().source(Some(map)))
    }

    #[test]
    fn test_default_config() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, ScannerConfig::default());
        assert_eq!(config.back_app_api_url, "http://127.0.0.1");
        assert_eq!(config.back_app_api_port, 8000);
        assert_eq!(config.back_app_api_endpoint, "consult_ticket");
        assert_eq!(config.barcode_serial_port, "/dev/scanner");
        assert_eq!(config.barcode_serial_baudrate, 115_200);
        assert_eq!(config.ticket_type, "barcode");
        assert_eq!(config.ticket_tariff_class, 0);
        assert!(!config.log_json);
    }

    #[test]
    fn test_custom_config() {
        let config = config_from(&[
            ("BACK_APP_API_URL", "https://tickets.local"),
            ("BACK_APP_API_PORT", "9443"),
            ("BACK_APP_API_ENDPOINT", "api/scan"),
            ("BARCODE_SERIAL_PORT", "/dev/ttyUSB0"),
            ("BARCODE_SERIAL_BAUDRATE", "9600"),
            ("TICKET_TYPE", "qr"),
            ("TICKET_TARIFF_CLASS", "3"),
            ("LOG_JSON", "true"),
        ])
        .unwrap();

        assert_eq!(config.back_app_api_url, "https://tickets.local");
        assert_eq!(config.back_app_api_port, 9443);
        assert_eq!(config.back_app_api_endpoint, "api/scan");
        assert_eq!(config.barcode_serial_port, "/dev/ttyUSB0");
        assert_eq!(config.barcode_serial_baudrate, 9600);
        assert_eq!(config.ticket_type, "qr");
        assert_eq!(config.ticket_tariff_class, 3);
        assert!(config.log_json);
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let config = config_from(&[("TICKET_TYPE", "parking")]).unwrap();
        assert_eq!(config.ticket_type, "parking");
        assert_eq!(config.back_app_api_port, 8000);
        assert_eq!(config.barcode_serial_port, "/dev/scanner");
    }

    #[test]
    fn test_unparsable_number_is_an_error() {
        assert!(config_from(&[("BARCODE_SERIAL_BAUDRATE", "fast")]).is_err());
    }

    fn no_process_vars() -> Vec<(String, String)> {
        Vec::new()
    }

    fn scratch_dotenv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "scanner_bridge-{}-{}.env",
            std::process::id(),
            name
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_dotenv_file_supplies_values() {
        let path = scratch_dotenv("supplies", "TICKET_TYPE=from_dotenv\nTICKET_TARIFF_CLASS=5\n");
        let config = ScannerConfig::from_vars(&path, no_process_vars());
        fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.ticket_type, "from_dotenv");
        assert_eq!(config.ticket_tariff_class, 5);
        assert_eq!(config.back_app_api_port, 8000);
    }

    #[test]
    fn test_process_env_overrides_dotenv_file() {
        let path = scratch_dotenv("overrides", "TICKET_TYPE=from_dotenv\n");
        let process = vec![("TICKET_TYPE".to_string(), "from_process".to_string())];
        let config = ScannerConfig::from_vars(&path, process);
        fs::remove_file(&path).unwrap();

        assert_eq!(config.unwrap().ticket_type, "from_process");
    }

    #[test]
    fn test_missing_dotenv_file_uses_defaults() {
        let path = std::env::temp_dir().join("scanner_bridge-no-such-file.env");
        let config = ScannerConfig::from_vars(&path, no_process_vars()).unwrap();
        assert_eq!(config, ScannerConfig::default());
    }

    #[test]
    fn test_api_url_joins_parts_verbatim() {
        let config = ScannerConfig {
            back_app_api_url: "http://10.0.0.5".to_string(),
            back_app_api_port: 8080,
            back_app_api_endpoint: "consult_ticket".to_string(),
            ..ScannerConfig::default()
        };
        assert_eq!(config.api_url(), "http://10.0.0.5:8080/consult_ticket");
    }

    #[test]
    fn test_serial_device_from_config() {
        let config = ScannerConfig::default();
        let device = config.serial_device();
        assert_eq!(device.path, "/dev/scanner");
        assert_eq!(device.baud_rate, 115_200);
    }
}
