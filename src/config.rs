//! Optional `gitscope.toml` settings, layered under CLI flags.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use gitscope_git::DEFAULT_DEPTH;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7895;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Repository to load when no `--repo` flag is given.
    pub repo: Option<PathBuf>,
    /// Commit walk depth.
    pub depth: Option<usize>,
    #[serde(default)]
    pub serve: ServeSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServeSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Config {
    /// Read `path` when given, else `gitscope.toml` in the working
    /// directory. Only an explicitly requested file is required to exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from("gitscope.toml"), false),
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => {
                let config = toml::from_str(&text)
                    .with_context(|| format!("malformed config at {}", path.display()))?;
                tracing::debug!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound && !required => Ok(Config::default()),
            Err(e) => {
                Err(e).with_context(|| format!("cannot read config at {}", path.display()))
            }
        }
    }

    pub fn repo(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.repo.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn depth(&self) -> usize {
        self.depth.unwrap_or(DEFAULT_DEPTH)
    }

    pub fn host(&self, cli: Option<String>) -> String {
        cli.or_else(|| self.serve.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    pub fn port(&self, cli: Option<u16>) -> u16 {
        cli.or(self.serve.port).unwrap_or(DEFAULT_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::default();
        assert_eq!(config.repo(None), PathBuf::from("."));
        assert_eq!(config.depth(), DEFAULT_DEPTH);
        assert_eq!(config.host(None), "127.0.0.1");
        assert_eq!(config.port(None), 7895);
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            repo = "/srv/repos/gitscope"
            depth = 250

            [serve]
            host = "0.0.0.0"
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(config.repo(None), PathBuf::from("/srv/repos/gitscope"));
        assert_eq!(config.depth(), 250);
        assert_eq!(config.host(None), "0.0.0.0");
        assert_eq!(config.port(None), 9000);
    }

    #[test]
    fn test_cli_flags_win() {
        let config: Config = toml::from_str(
            r#"
            repo = "/srv/repos/gitscope"

            [serve]
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(config.repo(Some("/tmp/other".into())), PathBuf::from("/tmp/other"));
        assert_eq!(config.port(Some(7000)), 7000);
        assert_eq!(config.host(Some("::1".into())), "::1");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/gitscope.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gitscope.toml");
        std::fs::write(&path, "depth = 42\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.depth(), 42);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gitscope.toml");
        std::fs::write(&path, "depth = \"not a number\"\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
