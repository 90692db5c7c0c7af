// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::error::Error;

use libslamrestart::error::{ErrorExt, ErrorMessage};
use libslamrestart::net::*;
use slog::{error, info, warn, Logger};
use thiserror::Error;
use tokio::net::TcpStream;

use crate::restore::Restorer;

/// The mapping process side of the protocol.
pub struct ServiceProto<R> {
    inner: Proto<Call<RestartRequest>, Reply<RestartResponse>>,
    log: Logger,
    service: ServiceName,
    restorer: R,
}

impl<R> ServiceProto<R>
where
    R: Restorer,
{
    pub fn new(log: Logger, stream: TcpStream, service: ServiceName, restorer: R) -> Self {
        Self {
            inner: Proto::new(stream),
            log,
            service,
            restorer,
        }
    }

    /// Serve a single call from a restarter.
    ///
    /// Returns whether the restore succeeded. Calls that could not be
    /// serviced are answered with an error before being returned as one.
    pub async fn handle_call(mut self) -> Result<bool, ServiceProtoError<R::Error>> {
        let Call { service, request } = self.inner.recv().await?;

        if service != self.service {
            warn!(self.log, "Received call for unknown service"; "service" => %service);
            self.inner
                .send(Reply {
                    result: Err(ErrorMessage(format!("no such service `{}'", service))),
                })
                .await?;

            return Err(ServiceProtoError::UnknownService(service));
        }

        info!(self.log, "Received restart request"; "archive" => %request.archive_name);

        match self.restorer.restore(&request.archive_name).await {
            Ok(success) => {
                self.inner
                    .send(Reply {
                        result: Ok(RestartResponse { success }),
                    })
                    .await?;

                Ok(success)
            }

            Err(e) => {
                error!(
                    self.log,
                    "Could not restore";
                    "archive" => %request.archive_name,
                    "error" => %e,
                );
                self.inner
                    .send(Reply {
                        result: Err(e.into_error_message()),
                    })
                    .await?;

                Err(ServiceProtoError::Restore(e))
            }
        }
    }
}

/// An error in the ServiceProto.
///
/// For a `ServiceProto<R: Restorer>`, `RestoreError` is `<R as Restorer>::Error`.
#[derive(Debug, Error)]
pub enum ServiceProtoError<RestoreError>
where
    RestoreError: Error + 'static,
{
    #[error(transparent)]
    Proto(#[from] ProtoError),

    #[error("no such service `{}'", .0)]
    UnknownService(ServiceName),

    #[error("could not restore: {}", .0)]
    Restore(#[source] RestoreError),
}
