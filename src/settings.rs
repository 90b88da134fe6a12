use serde::Deserialize;
use std::path::PathBuf;

use crate::conversation::DEFAULT_HISTORY_CAPACITY;
use crate::error::Result;
use crate::resolver::{ResolverConfig, DEFAULT_CONTINUATION_CUES, DEFAULT_SCORE_THRESHOLD};

pub const DEFAULT_MAX_SESSIONS: usize = 1024;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub data: DataSettings,
    #[serde(default)]
    pub logic: LogicSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DataSettings {
    pub catalogue_file: PathBuf,
    pub intents_file: PathBuf,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LogicSettings {
    pub score_threshold: u32,
    pub history_capacity: usize,
    pub continuation_cues: Vec<String>,
}

impl Default for LogicSettings {
    fn default() -> Self {
        Self {
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            continuation_cues: DEFAULT_CONTINUATION_CUES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Chat sessions kept in memory; the least recently used is evicted beyond this.
    pub max_sessions: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl Settings {
    /// Reads `name` (extension optional) and overlays `FAQ__SECTION__KEY`
    /// environment variables.
    pub fn load(name: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(name))
            .add_source(
                config::Environment::with_prefix("FAQ")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            score_threshold: self.logic.score_threshold,
            continuation_cues: self
                .logic
                .continuation_cues
                .iter()
                .map(|c| c.to_lowercase())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_file_and_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[data]
catalogue_file = "data/knowledge_base.json"
intents_file = "data/intents.json"

[logic]
score_threshold = 5
continuation_cues = ["MORE", "again"]
"#
        )
        .unwrap();

        let settings = Settings::load(path.to_str().unwrap()).unwrap();
        assert_eq!(settings.data.intents_file, PathBuf::from("data/intents.json"));
        assert_eq!(settings.logic.history_capacity, DEFAULT_HISTORY_CAPACITY);
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.max_sessions, DEFAULT_MAX_SESSIONS);

        let config = settings.resolver_config();
        assert_eq!(config.score_threshold, 5);
        assert_eq!(config.continuation_cues, vec!["more", "again"]);
    }

    #[test]
    fn missing_data_section_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Config.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();
        assert!(Settings::load(path.to_str().unwrap()).is_err());
    }
}
