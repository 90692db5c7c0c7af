// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::error::Error;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use slog::{info, warn, Logger};
use thiserror::Error;
use tokio::task::{spawn_blocking, JoinError};

use crate::zip::{unzip, ZipError, ZipStats};

/// The directory under the state directory that holds the restored graph.
pub const GRAPH_DIR: &str = "graph";

/// The directory under the state directory that an archive is extracted into
/// before it replaces the restored graph.
const STAGING_DIR: &str = "restoring";

/// A trait for restoring mapping state from a checkpoint archive.
#[async_trait]
pub trait Restorer {
    type Error: Error + 'static;

    /// Restore from the named archive.
    ///
    /// Returns `Ok(false)` when the archive is missing or unusable.
    async fn restore(&mut self, archive_name: &str) -> Result<bool, Self::Error>;
}

/// A [`Restorer`](trait.Restorer.html) that extracts zip archives from a
/// directory.
#[derive(Clone, Debug)]
pub struct ArchiveRestorer {
    log: Logger,
    archive_dir: PathBuf,
    state_dir: PathBuf,
}

impl ArchiveRestorer {
    pub fn new(log: Logger, archive_dir: PathBuf, state_dir: PathBuf) -> Self {
        ArchiveRestorer {
            log,
            archive_dir,
            state_dir,
        }
    }

    /// The directory the most recently restored archive was extracted into.
    pub fn graph_dir(&self) -> PathBuf {
        self.state_dir.join(GRAPH_DIR)
    }

    /// Resolve an archive name against the archive directory.
    ///
    /// Only bare file names are accepted.
    fn resolve(&self, archive_name: &str) -> Option<PathBuf> {
        let mut components = Path::new(archive_name).components();

        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Some(self.archive_dir.join(name)),
            _ => None,
        }
    }
}

#[async_trait]
impl Restorer for ArchiveRestorer {
    type Error = RestoreError;

    async fn restore(&mut self, archive_name: &str) -> Result<bool, Self::Error> {
        let archive = match self.resolve(archive_name) {
            Some(archive) => archive,
            None => {
                warn!(self.log, "Archive missing"; "archive" => archive_name);
                return Ok(false);
            }
        };

        info!(self.log, "Restoring from archive"; "archive" => %archive.display());

        let state_dir = self.state_dir.clone();
        let restored = spawn_blocking(move || extract_to_state_dir(&archive, &state_dir)).await??;

        match restored {
            Restored::Graph(stats) => {
                info!(
                    self.log,
                    "Restored graph";
                    "files" => stats.extracted,
                    "graph_dir" => %self.graph_dir().display(),
                );
                Ok(true)
            }

            Restored::Missing => {
                warn!(self.log, "Archive missing"; "archive" => archive_name);
                Ok(false)
            }

            Restored::Unusable => {
                warn!(self.log, "Archive is unusable"; "archive" => archive_name);
                Ok(false)
            }
        }
    }
}

/// The result of extracting an archive into the state directory.
#[derive(Debug)]
enum Restored {
    /// The archive replaced the restored graph.
    Graph(ZipStats),

    /// There is no archive file.
    Missing,

    /// The archive is corrupt or empty.
    Unusable,
}

/// Extract `archive` into `state_dir`, replacing any previously restored graph.
///
/// If the archive is missing, corrupt or empty the previously restored graph is
/// left in place.
fn extract_to_state_dir(archive: &Path, state_dir: &Path) -> Result<Restored, RestoreError> {
    if !archive.is_file() {
        return Ok(Restored::Missing);
    }

    let staging = state_dir.join(STAGING_DIR);
    let graph = state_dir.join(GRAPH_DIR);

    remove_dir_if_exists(&staging)?;

    let stats = match unzip(archive, &staging) {
        Ok(stats) if stats.extracted > 0 => stats,
        Ok(_) => {
            remove_dir_if_exists(&staging)?;
            return Ok(Restored::Unusable);
        }
        Err(e) if e.is_bad_archive() => {
            remove_dir_if_exists(&staging)?;
            return Ok(Restored::Unusable);
        }
        Err(e) => return Err(e.into()),
    };

    remove_dir_if_exists(&graph)?;
    fs::rename(&staging, &graph).map_err(|source| RestoreError::Io {
        path: graph.clone(),
        source,
    })?;

    Ok(Restored::Graph(stats))
}

fn remove_dir_if_exists(path: &Path) -> Result<(), RestoreError> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(RestoreError::Io {
            path: path.into(),
            source: e,
        }),
        _ => Ok(()),
    }
}

/// An error restoring from an archive.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error(transparent)]
    Zip(#[from] ZipError),

    #[error("IO error at `{}': {}", .path.display(), .source)]
    Io { path: PathBuf, source: io::Error },

    #[error("restore task failed: {}", .0)]
    Task(#[from] JoinError),
}
