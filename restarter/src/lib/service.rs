// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::error::Error;
use std::io;
use std::net::SocketAddr;

use async_trait::async_trait;
use libslamrestart::net::*;
use slog::{error, info, Logger};
use thiserror::Error;
use tokio::net::TcpStream;

/// The restarter side of the protocol.
pub type RestarterProto = Proto<Reply<RestartResponse>, Call<RestartRequest>>;

/// A mapping process that can be asked to restart from a checkpoint archive.
#[async_trait]
pub trait RestartService {
    type Error: Error + 'static;

    /// Ask the service to restart from the named archive.
    ///
    /// Returns whether the service found and loaded the archive.
    async fn restart(&mut self, archive_name: &str) -> Result<bool, Self::Error>;
}

/// A [`RestartService`](trait.RestartService.html) reached over TCP.
///
/// No connection is made until [`restart`](#method.restart) is called.
pub struct RemoteRestartService {
    log: Logger,
    host: SocketAddr,
    service: ServiceName,
}

impl RemoteRestartService {
    pub fn new(log: Logger, host: SocketAddr, service: ServiceName) -> Self {
        RemoteRestartService { log, host, service }
    }
}

#[async_trait]
impl RestartService for RemoteRestartService {
    type Error = RemoteRestartError;

    async fn restart(&mut self, archive_name: &str) -> Result<bool, Self::Error> {
        let stream = TcpStream::connect(self.host)
            .await
            .map_err(|source| RemoteRestartError::Connect {
                host: self.host,
                source,
            })?;
        info!(self.log, "Connected"; "peer" => self.host);

        let mut proto = RestarterProto::new(stream);
        proto
            .send(Call {
                service: self.service.clone(),
                request: RestartRequest {
                    archive_name: archive_name.into(),
                },
            })
            .await?;

        match proto.recv().await?.result {
            Ok(RestartResponse { success }) => {
                info!(self.log, "Received restart response"; "success" => success);
                Ok(success)
            }

            Err(e) => {
                error!(
                    self.log,
                    "Mapping process could not service restart";
                    "service" => %self.service,
                    "error" => %e,
                );
                Err(ProtoError::from(e).into())
            }
        }
    }
}

/// An error from a [`RemoteRestartService`](struct.RemoteRestartService.html).
#[derive(Debug, Error)]
pub enum RemoteRestartError {
    #[error("could not connect to `{}': {}", .host, .source)]
    Connect { host: SocketAddr, source: io::Error },

    #[error(transparent)]
    Proto(#[from] ProtoError),
}
