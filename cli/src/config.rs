use std::path::{Path, PathBuf};

use serde::Deserialize;
use terminology::{DictionaryError, ResolverConfig, TermDictionary, TermIndex};
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "notedoc.toml";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A dictionary that failed to load, with the text it was read from so
    /// the error can be rendered against it.
    #[error("invalid dictionary '{name}': {error}")]
    Dictionary {
        name: String,
        source_text: String,
        #[source]
        error: DictionaryError,
    },

    #[error("cannot encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Dictionary file; relative paths resolve against the config file's directory.
    pub dictionary: Option<PathBuf>,
    pub resolver: ResolverConfig,
}

impl Config {
    /// Load `explicit`, or `notedoc.toml` from `cwd` if it exists, or defaults.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Config, CliError> {
        match explicit {
            Some(path) => Config::load(path),
            None => {
                let candidate = cwd.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    Config::load(&candidate)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    pub fn load(path: &Path) -> Result<Config, CliError> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        if let (Some(dictionary), Some(base)) = (&config.dictionary, path.parent()) {
            if dictionary.is_relative() {
                config.dictionary = Some(base.join(dictionary));
            }
        }
        Ok(config)
    }

    /// `--dictionary` beats the config file, which beats the built-in set.
    pub fn dictionary_path<'a>(&'a self, flag: Option<&'a Path>) -> Option<&'a Path> {
        flag.or(self.dictionary.as_deref())
    }
}

/// Build the term index from a dictionary file, or the built-in dictionary.
pub fn load_index(path: Option<&Path>) -> Result<TermIndex, CliError> {
    let (name, text) = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            (path.display().to_string(), text)
        }
        None => (
            "<builtin>".to_string(),
            terminology::BUILTIN_DICTIONARY.to_string(),
        ),
    };

    let dictionary_error = |error: DictionaryError| CliError::Dictionary {
        name: name.clone(),
        source_text: text.clone(),
        error,
    };
    let dictionary = TermDictionary::from_toml_str(&text).map_err(dictionary_error)?;
    TermIndex::new(dictionary).map_err(dictionary_error)
}
