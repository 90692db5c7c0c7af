// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs::{self, File};
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use libfakeslam::proto::ServiceProto;
use libfakeslam::restore::ArchiveRestorer;
use libslamrestart::net::ServiceName;
use slog::{error, Logger};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use zip::write::FileOptions;
use zip::ZipWriter;

/// The contents of the pose graph in archives written by `write_archive`.
pub const POSE_GRAPH: &str = "VERTEX_SE3:QUAT 0 0.0 0.0 0.0 0.0 0.0 0.0 1.0";

/// A scratch area holding an archive directory and a state directory.
pub struct Fixture {
    _dir: TempDir,
    pub archive_dir: PathBuf,
    pub state_dir: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let archive_dir = dir.path().join("archives");
        let state_dir = dir.path().join("state");
        fs::create_dir(&archive_dir).unwrap();

        Fixture {
            _dir: dir,
            archive_dir,
            state_dir,
        }
    }

    /// Write a checkpoint archive with a pose graph and one keyed scan.
    pub fn write_archive(&self, name: &str) -> PathBuf {
        let path = self.archive_dir.join(name);
        write_archive(
            &path,
            &[
                ("pose_graph.g2o", POSE_GRAPH),
                ("keyed_scans/0.pcd", "VERSION 0.7"),
            ],
        );
        path
    }

    pub fn restorer(&self, log: Logger) -> ArchiveRestorer {
        ArchiveRestorer::new(log, self.archive_dir.clone(), self.state_dir.clone())
    }
}

/// Write a zip archive at `path` containing the given files.
pub fn write_archive(path: &Path, files: &[(&str, &str)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());

    for (name, contents) in files {
        zip.start_file(*name, FileOptions::default()).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }

    zip.finish().unwrap();
}

/// Serve `service` from a fakeslam restorer on an ephemeral port.
///
/// Calls are handled one at a time, as the fakeslam binary does.
pub async fn spawn_fakeslam(
    log: Logger,
    restorer: ArchiveRestorer,
    service: ServiceName,
) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            let proto = ServiceProto::new(log.clone(), stream, service.clone(), restorer.clone());

            if let Err(e) = proto.handle_call().await {
                error!(log, "Could not handle call"; "error" => %e);
            }
        }
    });

    (addr, handle)
}
