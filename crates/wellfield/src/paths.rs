use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories_next::BaseDirs;
use fieldconfig::FieldConfig;

pub const ENV_CONFIG: &str = "WELLFIELD_CONFIG";

const APPLICATION_DIR: &str = "wellfield";
const CONFIG_FILE: &str = "wellfield.toml";

/// Where a configuration path came from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Flag,
    Env,
    UserDir,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Flag => f.write_str("--config"),
            ConfigSource::Env => write!(f, "${ENV_CONFIG}"),
            ConfigSource::UserDir => f.write_str("user config directory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    pub source: ConfigSource,
}

impl ConfigLocation {
    /// Explicit locations must exist; the user directory file is optional.
    fn is_required(&self) -> bool {
        !matches!(self.source, ConfigSource::UserDir)
    }
}

/// Resolves the config path from the flag, then the environment, then the
/// user config directory. `None` when no location applies.
pub fn resolve_config_location(flag: Option<&Path>) -> Option<ConfigLocation> {
    resolve_from(flag, env_override(ENV_CONFIG), user_config_file())
}

fn resolve_from(
    flag: Option<&Path>,
    env_path: Option<PathBuf>,
    user_file: Option<PathBuf>,
) -> Option<ConfigLocation> {
    if let Some(path) = flag {
        return Some(ConfigLocation {
            path: path.to_path_buf(),
            source: ConfigSource::Flag,
        });
    }
    if let Some(path) = env_path {
        return Some(ConfigLocation {
            path,
            source: ConfigSource::Env,
        });
    }
    user_file.map(|path| ConfigLocation {
        path,
        source: ConfigSource::UserDir,
    })
}

/// Loads the resolved configuration, falling back to built-in defaults when
/// the optional user file is absent.
pub fn load_config(location: Option<&ConfigLocation>) -> Result<FieldConfig> {
    let Some(location) = location else {
        tracing::debug!("no configuration location available; using defaults");
        return Ok(FieldConfig::default());
    };

    if !location.is_required() && !location.path.exists() {
        tracing::debug!(path = %location.path.display(), "no user configuration; using defaults");
        return Ok(FieldConfig::default());
    }

    let config = FieldConfig::load(&location.path).with_context(|| {
        format!(
            "failed to load configuration from {} ({})",
            location.path.display(),
            location.source
        )
    })?;
    tracing::info!(
        path = %location.path.display(),
        source = %location.source,
        "loaded configuration"
    );
    Ok(config)
}

fn user_config_file() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join(APPLICATION_DIR).join(CONFIG_FILE))
}

fn env_override(name: &str) -> Option<PathBuf> {
    match env::var_os(name) {
        Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn flag_wins_over_env_and_user_dir() {
        let location = resolve_from(
            Some(Path::new("flag.toml")),
            Some(PathBuf::from("env.toml")),
            Some(PathBuf::from("user.toml")),
        )
        .unwrap();
        assert_eq!(location.path, PathBuf::from("flag.toml"));
        assert_eq!(location.source, ConfigSource::Flag);
    }

    #[test]
    fn env_wins_over_user_dir() {
        let location = resolve_from(
            None,
            Some(PathBuf::from("env.toml")),
            Some(PathBuf::from("user.toml")),
        )
        .unwrap();
        assert_eq!(location.source, ConfigSource::Env);
    }

    #[test]
    fn nothing_resolves_to_none() {
        assert_eq!(resolve_from(None, None, None), None);
        assert!(load_config(None).is_ok());
    }

    #[test]
    fn missing_user_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let location = ConfigLocation {
            path: dir.path().join("absent.toml"),
            source: ConfigSource::UserDir,
        };
        let config = load_config(Some(&location)).unwrap();
        assert_eq!(config.window.size, (800, 800));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let location = ConfigLocation {
            path: dir.path().join("absent.toml"),
            source: ConfigSource::Flag,
        };
        let err = load_config(Some(&location)).unwrap_err();
        assert!(format!("{err:#}").contains("--config"));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wellfield.toml");
        fs::write(&path, "version = 1\n[window]\nsize = \"320x200\"\n").unwrap();
        let location = ConfigLocation {
            path,
            source: ConfigSource::Env,
        };
        let config = load_config(Some(&location)).unwrap();
        assert_eq!(config.window.size, (320, 200));
    }
}
