// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::net::SocketAddr;

use libslamrestart::net::ServiceName;
use serde::Deserialize;

/// The configuration for the restarter.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// The address of the mapping process to connect to.
    pub host: SocketAddr,

    /// The name of the restart procedure on the mapping process.
    ///
    /// Defaults to `/husky/blam_slam/restart`.
    #[serde(default)]
    pub service: ServiceName,
}
