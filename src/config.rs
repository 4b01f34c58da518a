use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::simulation::modes::{Difficulty, GameMode};

pub const ENV_SEED: &str = "CURSED_SEED";
pub const ENV_DIFFICULTY: &str = "CURSED_DIFFICULTY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Parser, Default)]
#[command(name = "cursed-chronicles")]
#[command(about = "A text RPG of sorcerers and cursed spirits")]
pub struct Cli {
    /// TOML file layered over the built-in defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub seed: Option<u64>,
    /// JSON save file used by bare `save`/`load`.
    #[arg(long)]
    pub save: Option<PathBuf>,
    /// SQLite database holding named slots.
    #[arg(long)]
    pub db: Option<PathBuf>,
    #[arg(long)]
    pub difficulty: Option<String>,
    #[arg(long)]
    pub mode: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub background: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub seed: Option<u64>,
    pub save_path: PathBuf,
    pub save_db_path: PathBuf,
    pub difficulty: Difficulty,
    pub mode: GameMode,
    pub log_filter: String,
    /// Extra dialogue catalogs, one JSON file per tree set.
    pub content_dir: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            save_path: PathBuf::from("./saves/save.json"),
            save_db_path: PathBuf::from("./saves/slots.db"),
            difficulty: Difficulty::Normal,
            mode: GameMode::Story,
            log_filter: "warn".to_string(),
            content_dir: None,
        }
    }
}

impl GameConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Toml {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply `CURSED_*` overrides. `lookup` stands in for `std::env::var`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(raw) = lookup(ENV_SEED) {
            let seed = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid(format!("{}={}", ENV_SEED, raw)))?;
            self.seed = Some(seed);
        }
        if let Some(raw) = lookup(ENV_DIFFICULTY) {
            self.difficulty = raw
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{}={}", ENV_DIFFICULTY, raw)))?;
        }
        Ok(())
    }

    pub fn apply_cli(&mut self, cli: &Cli) -> Result<(), ConfigError> {
        if let Some(seed) = cli.seed {
            self.seed = Some(seed);
        }
        if let Some(path) = &cli.save {
            self.save_path = path.clone();
        }
        if let Some(path) = &cli.db {
            self.save_db_path = path.clone();
        }
        if let Some(raw) = &cli.difficulty {
            self.difficulty = raw
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("--difficulty {}", raw)))?;
        }
        if let Some(raw) = &cli.mode {
            self.mode = raw
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("--mode {}", raw)))?;
        }
        Ok(())
    }

    /// Defaults, then the TOML file, then the environment, then the flags.
    pub fn resolve(cli: &Cli, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.apply_cli(cli)?;
        debug!(?config, "resolved config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_point_at_the_saves_dir() {
        let config = GameConfig::resolve(&Cli::default(), no_env).expect("resolve");
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.save_path, PathBuf::from("./saves/save.json"));
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn layers_apply_in_order() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "seed = 5\ndifficulty = \"easy\"\nmode = \"boss_rush\"\nlog_filter = \"info\"")
            .expect("write");

        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            difficulty: Some("hard".into()),
            ..Cli::default()
        };
        let env = |key: &str| (key == ENV_SEED).then(|| "99".to_string());
        let config = GameConfig::resolve(&cli, env).expect("resolve");

        assert_eq!(config.seed, Some(99));
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.mode, GameMode::BossRush);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn bad_values_are_reported() {
        let env = |key: &str| (key == ENV_DIFFICULTY).then(|| "nightmare".to_string());
        assert!(matches!(
            GameConfig::resolve(&Cli::default(), env),
            Err(ConfigError::Invalid(_))
        ));

        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "seed = \"not a number\"").expect("write");
        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            ..Cli::default()
        };
        assert!(matches!(GameConfig::resolve(&cli, no_env), Err(ConfigError::Toml { .. })));
    }
}
