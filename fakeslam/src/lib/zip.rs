// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs::{create_dir_all, File};
use std::io;
use std::path::{Path, PathBuf};

use ::zip::result::ZipError as ArchiveError;
use ::zip::ZipArchive;
use thiserror::Error;

/// Statistics about an unzip operation.
#[derive(Debug, Default, Eq, PartialEq)]
pub struct ZipStats {
    /// The number of extracted files.
    pub extracted: usize,

    /// The number of directory entries created.
    pub directories: usize,
}

/// Unzip the archive at the given location into the target directory.
///
/// Entries that would escape the target directory are refused.
pub fn unzip(archive: &Path, target: &Path) -> Result<ZipStats, ZipError> {
    let mut stats = ZipStats::default();

    let zip_file = File::open(archive).map_err(|source| ZipError::OpenArchive {
        archive: archive.into(),
        source,
    })?;

    let mut zip = ZipArchive::new(zip_file).map_err(|source| ZipError::ReadArchive {
        archive: archive.into(),
        source,
    })?;

    create_dir_all(target).map_err(|source| ZipError::MakeDir {
        path: target.into(),
        source,
    })?;

    for i in 0..zip.len() {
        let mut zipped = zip.by_index(i).map_err(|source| ZipError::ReadArchive {
            archive: archive.into(),
            source,
        })?;

        let path = match zipped.enclosed_name() {
            Some(name) => target.join(name),
            None => {
                return Err(ZipError::UnsafeEntry {
                    archive: archive.into(),
                    name: zipped.name().into(),
                })
            }
        };

        if zipped.is_dir() {
            create_dir_all(&path).map_err(|source| ZipError::MakeDir {
                path: path.clone(),
                source,
            })?;
            stats.directories += 1;
            continue;
        }

        if let Some(parent) = path.parent() {
            create_dir_all(parent).map_err(|source| ZipError::MakeDir {
                path: parent.into(),
                source,
            })?;
        }

        let mut writer = File::create(&path).map_err(|source| ZipError::Io {
            archive: archive.into(),
            file_name: path.clone(),
            source,
        })?;

        io::copy(&mut zipped, &mut writer).map_err(|source| ZipError::Io {
            archive: archive.into(),
            file_name: path,
            source,
        })?;

        stats.extracted += 1;
    }

    Ok(stats)
}

#[derive(Debug, Error)]
pub enum ZipError {
    #[error("Could not open archive `{}': {}", .archive.display(), .source)]
    OpenArchive { archive: PathBuf, source: io::Error },

    #[error("Could not read archive `{}': {}", .archive.display(), .source)]
    ReadArchive {
        archive: PathBuf,
        source: ArchiveError,
    },

    #[error("Archive `{}' contains an entry outside of its root: `{}'", .archive.display(), .name)]
    UnsafeEntry { archive: PathBuf, name: String },

    #[error("Could not create directory `{}': {}", .path.display(), .source)]
    MakeDir { path: PathBuf, source: io::Error },

    #[error(
        "IO error while extracting `{}' from archive `{}': {}",
        .file_name.display(),
        .archive.display(),
        .source
    )]
    Io {
        archive: PathBuf,
        file_name: PathBuf,
        source: io::Error,
    },
}

impl ZipError {
    /// Whether the error is a problem with the archive itself, as opposed to
    /// a problem writing out its contents.
    pub fn is_bad_archive(&self) -> bool {
        match self {
            ZipError::OpenArchive { .. }
            | ZipError::ReadArchive { .. }
            | ZipError::UnsafeEntry { .. } => true,
            ZipError::MakeDir { .. } | ZipError::Io { .. } => false,
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::Path;

    use ::zip::write::FileOptions;
    use ::zip::ZipWriter;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    use super::*;

    /// Write a zip archive at `path` containing the given files.
    pub fn write_archive(path: &Path, files: &[(&str, &str)]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());

        for (name, contents) in files {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }

        zip.finish().unwrap();
    }

    #[test]
    fn test_unzip() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("pointcloud_backup.zip");
        let target = dir.path().join("graph");

        write_archive(
            &archive,
            &[
                ("graph/pose_graph.g2o", "VERTEX_SE3:QUAT 0 0 0 0 0 0 0 1"),
                ("graph/keyed_scans/0.pcd", "VERSION 0.7"),
            ],
        );

        assert_eq!(
            unzip(&archive, &target).unwrap(),
            ZipStats {
                extracted: 2,
                directories: 0,
            }
        );
        assert_eq!(
            fs::read_to_string(target.join("graph").join("pose_graph.g2o")).unwrap(),
            "VERTEX_SE3:QUAT 0 0 0 0 0 0 0 1"
        );
        assert!(target.join("graph").join("keyed_scans").join("0.pcd").is_file());
    }

    #[test]
    fn test_unzip_missing() {
        let dir = TempDir::new().unwrap();

        let err = unzip(&dir.path().join("missing.zip"), dir.path()).unwrap_err();
        assert_matches!(err, ZipError::OpenArchive { .. });
        assert!(err.is_bad_archive());
    }

    #[test]
    fn test_unzip_not_zip() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("pointcloud_backup.zip");
        fs::write(&archive, "this is not a zip file").unwrap();

        let err = unzip(&archive, &dir.path().join("graph")).unwrap_err();
        assert_matches!(err, ZipError::ReadArchive { .. });
        assert!(err.is_bad_archive());
    }

    #[test]
    fn test_unzip_unsafe_entry() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("pointcloud_backup.zip");
        write_archive(&archive, &[("../escaped.g2o", "")]);

        let err = unzip(&archive, &dir.path().join("graph")).unwrap_err();
        assert_matches!(err, ZipError::UnsafeEntry { ref name, .. } => {
            assert_eq!(name, "../escaped.g2o");
        });
        assert!(err.is_bad_archive());
        assert!(!dir.path().join("escaped.g2o").exists());
    }
}
