use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    pub inference_service: InferenceServiceConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.try_into().map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize, Clone)]
pub struct InferenceServiceConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl InferenceServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn get_predict_url(&self) -> String {
        format!("{}/predict", self.trimmed_base_url())
    }

    pub fn get_ping_url(&self) -> String {
        format!("{}/ping", self.trimmed_base_url())
    }

    pub fn get_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[derive(Clone, Deserialize, Debug)]
pub struct CameraConfig {
    #[serde(default = "default_capture_dir")]
    pub capture_dir: PathBuf,
}

fn default_capture_dir() -> PathBuf {
    PathBuf::from("captures")
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            capture_dir: default_capture_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub enum Environment {
    Local,
    Emulator,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Emulator => "emulator",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "emulator" => Ok(Self::Emulator),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local`, `emulator` or `production`.",
                other
            )),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub enum LogLevel {
    Debug,
    Info,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            other => Err(format!(
                "{} is not a supported minimum log level. Use either `debug` or `info`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Config, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("no current directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    load_configuration(&configuration_directory, &environment)
}

pub fn load_configuration(
    configuration_directory: &Path,
    environment: &Environment,
) -> Result<Config, config::ConfigError> {
    build_configuration(configuration_directory, environment, None)
}

fn build_configuration(
    configuration_directory: &Path,
    environment: &Environment,
    env_vars: Option<config::Map<String, String>>,
) -> Result<Config, config::ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(
            config::File::from(
                configuration_directory.join(format!("{}.yaml", environment.as_str())),
            )
            .required(false),
        )
        .add_source(
            config::Environment::with_prefix("LEAF")
                .prefix_separator("_")
                .separator("__")
                .source(env_vars),
        )
        .build()?;

    let config: Config = config.try_deserialize::<Config>()?;
    tracing::debug!(
        environment = environment.as_str(),
        base_url = %config.inference_service.base_url,
        "configuration loaded"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_configuration(dir: &Path) {
        fs::write(
            dir.join("base.yaml"),
            "log_level: info\ninference_service:\n  base_url: http://127.0.0.1:9000\ncamera:\n  capture_dir: captures\n",
        )
        .unwrap();
        fs::write(
            dir.join("emulator.yaml"),
            "inference_service:\n  base_url: http://10.0.2.2:9000\n",
        )
        .unwrap();
    }

    #[test]
    fn test_environment_file_overrides_base() {
        let dir = tempfile::tempdir().unwrap();
        write_configuration(dir.path());

        let local = load_configuration(dir.path(), &Environment::Local).unwrap();
        assert_eq!(local.inference_service.base_url, "http://127.0.0.1:9000");

        let emulator = load_configuration(dir.path(), &Environment::Emulator).unwrap();
        assert_eq!(emulator.inference_service.base_url, "http://10.0.2.2:9000");
        assert_eq!(emulator.log_level, LogLevel::Info);
    }

    #[test]
    fn test_prefixed_variables_override_files() {
        let dir = tempfile::tempdir().unwrap();
        write_configuration(dir.path());
        let env_vars = config::Map::from([
            (
                "LEAF_INFERENCE_SERVICE__BASE_URL".to_string(),
                "http://override:1".to_string(),
            ),
            (
                "LEAF_INFERENCE_SERVICE__TIMEOUT_SECS".to_string(),
                "5".to_string(),
            ),
            ("OTHER_LOG_LEVEL".to_string(), "debug".to_string()),
        ]);

        let config =
            build_configuration(dir.path(), &Environment::Emulator, Some(env_vars)).unwrap();

        assert_eq!(config.inference_service.base_url, "http://override:1");
        assert_eq!(config.inference_service.get_timeout(), Duration::from_secs(5));
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_timeout_defaults_to_thirty_seconds() {
        let dir = tempfile::tempdir().unwrap();
        write_configuration(dir.path());

        let config = load_configuration(dir.path(), &Environment::Local).unwrap();
        assert_eq!(config.inference_service.get_timeout(), Duration::from_secs(30));
        assert_eq!(
            InferenceServiceConfig::new("http://x").get_timeout(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_urls_tolerate_trailing_slash() {
        let service = InferenceServiceConfig::new("http://localhost:9000/");
        assert_eq!(service.get_predict_url(), "http://localhost:9000/predict");
        assert_eq!(service.get_ping_url(), "http://localhost:9000/ping");
    }

    #[test]
    fn test_rejects_unknown_environment() {
        let err = Environment::try_from("staging".to_string()).unwrap_err();
        assert!(err.contains("staging"));
        assert_eq!(
            Environment::try_from("Emulator".to_string()).unwrap(),
            Environment::Emulator
        );
    }
}
