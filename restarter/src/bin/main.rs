// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::env;
use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};

use librestarter::config::Config;
use librestarter::invoker::{invoke, report, usage};
use librestarter::service::RemoteRestartService;
use libslamrestart::error::ErrorMessage;
use libslamrestart::interrupt::Interrupt;
use libslamrestart::net::ServiceName;
use libslamrestart::{run, CommonOptions};
use slog::{info, Logger};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "restarter",
    about = "Restart a mapping process from a checkpoint archive"
)]
struct Options {
    /// The configuration file to use.
    #[structopt(long = "config", default_value = "slamrestart.toml")]
    config_path: PathBuf,

    /// The name of the restart procedure, overriding the configuration file.
    #[structopt(long)]
    service: Option<ServiceName>,

    /// The file name of the checkpoint archive to restart from.
    ///
    /// The archive is resolved by the mapping process, not on this machine.
    archive_name: Option<String>,
}

impl CommonOptions for Options {
    fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn usage(&self) -> Option<String> {
        match self.archive_name.as_deref() {
            Some(name) if !name.is_empty() => None,
            _ => {
                let program = env::args_os()
                    .next()
                    .map(|arg| arg.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "restarter".into());
                Some(usage(&program))
            }
        }
    }
}

fn main() {
    run::<Options, Config, _, _>(restarter, "restarter");
}

async fn restarter(
    log: Logger,
    options: Options,
    config: Config,
    mut interrupt: Interrupt,
) -> Result<(), Box<dyn Error>> {
    let archive_name = options
        .archive_name
        .ok_or(ErrorMessage("no archive name given"))?;
    let service_name = options.service.unwrap_or(config.service);

    info!(log, "Restarting mapping process"; "peer" => config.host, "service" => %service_name);

    let mut service = RemoteRestartService::new(log.clone(), config.host, service_name);
    let outcome = invoke(&log, &mut service, &archive_name, &mut interrupt).await?;

    report(outcome, &archive_name, &mut io::stdout())?;

    Ok(())
}
