//! Locating the interpreter configuration.

use anyhow::{Context, Result};
use directories_next::ProjectDirs;
use std::path::{Path, PathBuf};
use verdict_core::InterpreterConfig;

pub const CONFIG_FILE_NAME: &str = "interpreter.toml";

/// `<config dir>/verdict/interpreter.toml` on this platform.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "verdict").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// An explicit path must load. The fallback path is optional: when it is
/// missing or broken the built-in defaults are used.
pub fn load_interpreter_config(
    explicit: Option<&Path>,
    fallback: Option<&Path>,
) -> Result<InterpreterConfig> {
    if let Some(path) = explicit {
        return InterpreterConfig::load(path)
            .with_context(|| format!("loading interpreter config {}", path.display()));
    }
    match fallback {
        Some(path) if path.is_file() => match InterpreterConfig::load(path) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded interpreter config");
                Ok(config)
            }
            Err(e) => {
                tracing::warn!("ignoring interpreter config {}: {e}", path.display());
                Ok(InterpreterConfig::default())
            }
        },
        _ => Ok(InterpreterConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn explicit_path_must_exist() {
        let err = load_interpreter_config(Some(Path::new("nope/interpreter.toml")), None)
            .unwrap_err();
        assert!(format!("{err:#}").contains("nope/interpreter.toml"));
    }

    #[test]
    fn explicit_path_wins_over_fallback() -> Result<()> {
        let dir = tempdir()?;
        let explicit = dir.path().join("a.toml");
        let fallback = dir.path().join("b.toml");
        fs::write(&explicit, "[wording]\nplaceholder_label = \"A\"\n")?;
        fs::write(&fallback, "[wording]\nplaceholder_label = \"B\"\n")?;
        let config = load_interpreter_config(Some(&explicit), Some(&fallback))?;
        assert_eq!(config.wording.placeholder_label, "A");
        Ok(())
    }

    #[test]
    fn broken_fallback_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let fallback = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&fallback, "not = [valid")?;
        let config = load_interpreter_config(None, Some(&fallback))?;
        assert_eq!(config, InterpreterConfig::default());
        Ok(())
    }

    #[test]
    fn missing_fallback_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = load_interpreter_config(None, Some(&dir.path().join(CONFIG_FILE_NAME)))?;
        assert_eq!(config, InterpreterConfig::default());
        Ok(())
    }
}
