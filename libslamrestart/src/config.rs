// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use toml::Value;

/// Read the given section from the given configuration file and deserialize it as a `T`.
pub fn read_config<T, P>(path: P, section: &'static str) -> Result<T, ConfigError>
where
    for<'de> T: Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => ConfigError::OpenConfig {
            path: path.into(),
            source,
        },
        _ => ConfigError::ReadConfig {
            path: path.into(),
            source,
        },
    })?;

    parse_section(&contents, section).map_err(|e| e.at(path))
}

/// Parse the given section out of the TOML document in `contents`.
fn parse_section<T>(contents: &str, section: &'static str) -> Result<T, SectionError>
where
    for<'de> T: Deserialize<'de>,
{
    let mut document = toml::from_str::<Value>(contents)?;

    document
        .as_table_mut()
        .and_then(|table| table.remove(section))
        .ok_or(SectionError::Missing(section))?
        .try_into()
        .map_err(Into::into)
}

/// An error from [`parse_section`](fn.parse_section.html) that does not yet
/// know which file it came from.
enum SectionError {
    Missing(&'static str),
    Parse(toml::de::Error),
}

impl From<toml::de::Error> for SectionError {
    fn from(e: toml::de::Error) -> Self {
        SectionError::Parse(e)
    }
}

impl SectionError {
    fn at(self, path: &Path) -> ConfigError {
        match self {
            SectionError::Missing(section) => ConfigError::MissingSection {
                path: path.into(),
                section,
            },
            SectionError::Parse(source) => ConfigError::Parse {
                path: path.into(),
                source,
            },
        }
    }
}

/// An error occurred while loading or parsing a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be opened.
    #[error("Could not open config file `{}': {}", .path.display(), .source)]
    OpenConfig { path: PathBuf, source: io::Error },

    /// The file could not be read.
    #[error("Could not read config file `{}': {}", .path.display(), .source)]
    ReadConfig { path: PathBuf, source: io::Error },

    /// The required section was missing from the config file.
    #[error("Missing `{}' section in config file `{}'", .section, .path.display())]
    MissingSection {
        path: PathBuf,
        section: &'static str,
    },

    /// The file could not be parsed.
    #[error("Could not parse config file `{}': {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod test {
    use std::io::Write;
    use std::net::SocketAddr;

    use assert_matches::assert_matches;
    use indoc::indoc;
    use tempfile::NamedTempFile;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct TestConfig {
        host: SocketAddr,
        #[serde(default)]
        name: Option<String>,
    }

    fn config_file(contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_read_config() {
        let f = config_file(indoc! {r#"
            [restarter]
            host = "127.0.0.1:7711"

            [fakeslam]
            host = "0.0.0.0:7711"
            name = "/fake"
        "#});

        let config: TestConfig = read_config(f.path(), "restarter").unwrap();
        assert_eq!(config.host, "127.0.0.1:7711".parse().unwrap());
        assert_eq!(config.name, None);

        let config: TestConfig = read_config(f.path(), "fakeslam").unwrap();
        assert_eq!(config.host, "0.0.0.0:7711".parse().unwrap());
        assert_eq!(config.name.as_deref(), Some("/fake"));
    }

    #[test]
    fn test_read_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slamrestart.toml");

        assert_matches!(
            read_config::<TestConfig, _>(&path, "restarter"),
            Err(ConfigError::OpenConfig { path: p, .. }) => {
                assert_eq!(p, path);
            }
        );
    }

    #[test]
    fn test_read_config_missing_section() {
        let f = config_file(indoc! {r#"
            [fakeslam]
            host = "0.0.0.0:7711"
        "#});

        assert_matches!(
            read_config::<TestConfig, _>(f.path(), "restarter"),
            Err(ConfigError::MissingSection { section: "restarter", .. })
        );
    }

    #[test]
    fn test_read_config_parse_error() {
        let f = config_file("[restarter\nhost = ");
        assert_matches!(
            read_config::<TestConfig, _>(f.path(), "restarter"),
            Err(ConfigError::Parse { .. })
        );

        let f = config_file(indoc! {r#"
            [restarter]
            host = "not an address"
        "#});
        assert_matches!(
            read_config::<TestConfig, _>(f.path(), "restarter"),
            Err(ConfigError::Parse { .. })
        );
    }
}
