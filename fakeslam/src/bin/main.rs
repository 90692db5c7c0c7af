// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};

use libfakeslam::config::Config;
use libfakeslam::proto::ServiceProto;
use libfakeslam::restore::ArchiveRestorer;
use libslamrestart::interrupt::Interrupt;
use libslamrestart::net::ServiceName;
use libslamrestart::{run, CommonOptions};
use slog::{error, info, Logger};
use structopt::StructOpt;
use tokio::net::TcpListener;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "fakeslam",
    about = "Serve the restart procedure of a mapping process"
)]
struct Options {
    /// The configuration file to use.
    #[structopt(long = "config", default_value = "slamrestart.toml")]
    config_path: PathBuf,
}

impl CommonOptions for Options {
    fn config_path(&self) -> &Path {
        &self.config_path
    }
}

fn main() {
    run::<Options, Config, _, _>(fakeslam, "fakeslam");
}

async fn fakeslam(
    log: Logger,
    _options: Options,
    config: Config,
    mut interrupt: Interrupt,
) -> Result<(), Box<dyn Error>> {
    let restorer = ArchiveRestorer::new(log.clone(), config.archive_dir, config.state_dir);
    let listener = TcpListener::bind(&config.host).await?;

    info!(log, "Serving"; "host" => config.host, "service" => %config.service);

    loop {
        tokio::select! {
            biased;

            _ = interrupt.triggered() => {
                info!(log, "Interrupted; shutting down");
                return Ok(());
            }

            result = serve_one(&log, &listener, &config.service, &restorer) => result?,
        }
    }
}

/// Accept a single connection and serve its call.
///
/// Only accepting can fail; a failed call only affects the restarter that made
/// it and is logged.
async fn serve_one(
    log: &Logger,
    listener: &TcpListener,
    service: &ServiceName,
    restorer: &ArchiveRestorer,
) -> io::Result<()> {
    let (stream, addr) = listener.accept().await?;
    info!(log, "Received connection"; "peer" => addr);

    let proto = ServiceProto::new(
        log.new(slog::o! { "peer" => addr }),
        stream,
        service.clone(),
        restorer.clone(),
    );

    if let Err(e) = proto.handle_call().await {
        error!(log, "Could not handle call"; "peer" => addr, "error" => %e);
    }

    Ok(())
}
