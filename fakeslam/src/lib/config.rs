// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::net::SocketAddr;
use std::path::PathBuf;

use libslamrestart::net::ServiceName;
use serde::Deserialize;

/// The configuration for fakeslam.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// The address and port to listen on.
    pub host: SocketAddr,

    /// The name of the restart procedure to serve.
    #[serde(default)]
    pub service: ServiceName,

    /// The directory that checkpoint archive names are resolved against.
    pub archive_dir: PathBuf,

    /// The directory that restored checkpoints are extracted into.
    pub state_dir: PathBuf,
}
