// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::error::Error;
use std::fmt::Debug;
use std::future::Future;
use std::path::Path;
use std::process::exit;

use serde::Deserialize;
use slog::{error, info, Logger};
use structopt::StructOpt;
use tokio::runtime::Runtime;

use crate::config::read_config;
use crate::interrupt::Interrupt;
use crate::logging::build_logger;

pub mod config;
pub mod error;
pub mod interrupt;
pub mod logging;
pub mod net;

/// A trait for exposing options common to both restarter and fakeslam.
pub trait CommonOptions: StructOpt + Debug {
    /// The path to the `slamrestart.toml` file.
    fn config_path(&self) -> &Path;

    /// A usage message to print instead of running.
    ///
    /// This is checked before the configuration file is read, so incomplete
    /// invocations never touch the config or the network.
    fn usage(&self) -> Option<String> {
        None
    }
}

/// A common main function that handles setting up logging and running `F` on a
/// tokio runtime.
///
/// `F` is handed an [`Interrupt`](interrupt/struct.Interrupt.html) that fires
/// when the process receives SIGINT or SIGTERM.
pub fn run<O, C, F, Fut>(f: F, section: &'static str)
where
    O: CommonOptions,
    for<'de> C: Deserialize<'de>,
    Fut: Future<Output = Result<(), Box<dyn Error>>>,
    F: FnOnce(Logger, O, C, Interrupt) -> Fut,
{
    let options = O::from_args();
    let log = build_logger();

    info!(log, "read command-line options"; "options" => ?options);

    if let Some(usage) = options.usage() {
        println!("{}", usage);
        return;
    }

    let result = read_config(options.config_path(), section)
        .map_err(|e| Box::new(e) as Box<dyn Error>)
        .and_then({
            let log = log.clone();
            move |config| {
                let rt = Runtime::new()?;
                let interrupt = {
                    let _guard = rt.enter();
                    Interrupt::from_signals()?
                };

                rt.block_on(f(log, options, config, interrupt))
            }
        });

    if let Err(e) = result {
        error!(log, "unexpected error"; "error" => %e);
        // We have to explicitly drop log here to flush output because
        // std::process::exit will not.
        drop(log);
        exit(1);
    }
}
