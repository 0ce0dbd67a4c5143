use std::fs;
use std::path::{Path, PathBuf};
use log::LevelFilter;
use serde::Deserialize;

/// What the session does after reporting a block-aborting error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    #[default]
    SkipBlock,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub on_syntax_error: ErrorPolicy,
    pub on_runtime_error: ErrorPolicy,
    pub prompt: String,
    pub continuation_prompt: String,
    pub echo_store: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            on_syntax_error: ErrorPolicy::SkipBlock,
            on_runtime_error: ErrorPolicy::SkipBlock,
            prompt: "> ".to_string(),
            continuation_prompt: "... ".to_string(),
            echo_store: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file_level: Option<String>,
    pub dir: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn level(&self) -> Result<Option<LevelFilter>, Box<dyn std::error::Error>> {
        parse_level(self.level.as_deref())
    }

    pub fn file_level(&self) -> Result<Option<LevelFilter>, Box<dyn std::error::Error>> {
        parse_level(self.file_level.as_deref())
    }
}

fn parse_level(level: Option<&str>) -> Result<Option<LevelFilter>, Box<dyn std::error::Error>> {
    match level {
        Some(name) => name
            .parse::<LevelFilter>()
            .map(Some)
            .map_err(|_| format!("Unknown log level '{}'", name).into()),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Config, Box<dyn std::error::Error>> {
        let config: Config = toml::de::from_str(content)?;
        Ok(config)
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
    Config::from_toml(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.session.prompt, "> ");
        assert_eq!(config.session.on_syntax_error, ErrorPolicy::SkipBlock);
    }

    #[test]
    fn reads_session_and_logging_tables() {
        let config = Config::from_toml(indoc! {r#"
            [session]
            on_syntax_error = "exit"
            on_runtime_error = "skip-block"
            prompt = "basic> "
            echo_store = true

            [logging]
            level = "debug"
            dir = "logs"
        "#})
        .unwrap();

        assert_eq!(config.session.on_syntax_error, ErrorPolicy::Exit);
        assert_eq!(config.session.on_runtime_error, ErrorPolicy::SkipBlock);
        assert_eq!(config.session.prompt, "basic> ");
        assert_eq!(config.session.continuation_prompt, "... ");
        assert!(config.session.echo_store);
        assert_eq!(config.logging.level().unwrap(), Some(LevelFilter::Debug));
        assert_eq!(config.logging.file_level().unwrap(), None);
        assert_eq!(config.logging.dir, Some(PathBuf::from("logs")));
    }

    #[test]
    fn rejects_unknown_keys_and_levels() {
        assert!(Config::from_toml("[session]\nverbose = true\n").is_err());
        let config = Config::from_toml("[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(config.logging.level().is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config("does/not/exist.toml").is_err());
    }
}
