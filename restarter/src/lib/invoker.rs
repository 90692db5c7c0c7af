// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io::{self, Write};

use libslamrestart::interrupt::Interrupt;
use slog::{info, warn, Logger};

use crate::service::RestartService;

/// The result of asking a mapping process to restart.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The mapping process restarted from the archive.
    Restarted,

    /// The mapping process could not find or load the archive.
    ArchiveMissing,

    /// The process was interrupted before a response arrived.
    Interrupted,
}

/// Ask `service` to restart from `archive_name`, giving up quietly if
/// `interrupt` fires first.
///
/// An interrupt that has already fired wins without the service being
/// contacted at all.
pub async fn invoke<S>(
    log: &Logger,
    service: &mut S,
    archive_name: &str,
    interrupt: &mut Interrupt,
) -> Result<Outcome, S::Error>
where
    S: RestartService,
{
    if interrupt.is_triggered() {
        info!(log, "Interrupted before requesting restart");
        return Ok(Outcome::Interrupted);
    }

    info!(log, "Requesting restart"; "archive" => archive_name);

    let result = tokio::select! {
        biased;

        _ = interrupt.triggered() => None,
        result = service.restart(archive_name) => Some(result),
    };

    match result {
        None => {
            info!(log, "Interrupted while waiting for restart");
            Ok(Outcome::Interrupted)
        }

        Some(Ok(true)) => {
            info!(log, "Mapping process restarted"; "archive" => archive_name);
            Ok(Outcome::Restarted)
        }

        Some(Ok(false)) => {
            warn!(log, "Mapping process could not load archive"; "archive" => archive_name);
            Ok(Outcome::ArchiveMissing)
        }

        Some(Err(e)) => Err(e),
    }
}

/// Write the operator-facing message for `outcome`.
///
/// Nothing is written for an interrupted restart.
pub fn report<W>(outcome: Outcome, archive_name: &str, out: &mut W) -> io::Result<()>
where
    W: Write,
{
    match outcome {
        Outcome::Restarted => writeln!(out, "Successfully restarted from graph"),
        Outcome::ArchiveMissing => writeln!(out, "Error: {} missing", archive_name),
        Outcome::Interrupted => Ok(()),
    }
}

/// The usage line printed when no archive is given.
pub fn usage(program: &str) -> String {
    format!("Usage: {} filename.zip", program)
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use futures::future;
    use libslamrestart::error::ErrorMessage;

    use super::*;

    fn test_logger() -> Logger {
        Logger::root(slog::Discard, slog::o! {})
    }

    /// How a `TestRestartService` answers.
    #[derive(Clone, Copy, Debug)]
    enum Behaviour {
        Answer(bool),
        Fail(&'static str),
        Hang,
    }

    #[derive(Debug)]
    struct TestRestartService {
        behaviour: Behaviour,
        requested: Vec<String>,
    }

    impl TestRestartService {
        fn new(behaviour: Behaviour) -> Self {
            TestRestartService {
                behaviour,
                requested: vec![],
            }
        }
    }

    #[async_trait]
    impl RestartService for TestRestartService {
        type Error = ErrorMessage<&'static str>;

        async fn restart(&mut self, archive_name: &str) -> Result<bool, Self::Error> {
            self.requested.push(archive_name.into());

            match self.behaviour {
                Behaviour::Answer(success) => Ok(success),
                Behaviour::Fail(e) => Err(ErrorMessage(e)),
                Behaviour::Hang => future::pending().await,
            }
        }
    }

    async fn invoke_and_report(
        service: &mut TestRestartService,
        interrupt: &mut Interrupt,
    ) -> (Result<Outcome, ErrorMessage<&'static str>>, String) {
        let result = invoke(&test_logger(), service, "pointcloud_backup.zip", interrupt).await;

        let mut out = Vec::new();
        if let Ok(outcome) = result {
            report(outcome, "pointcloud_backup.zip", &mut out).unwrap();
        }

        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_restarted() {
        let mut service = TestRestartService::new(Behaviour::Answer(true));

        let (result, out) = invoke_and_report(&mut service, &mut Interrupt::never()).await;

        assert_eq!(result.unwrap(), Outcome::Restarted);
        assert_eq!(out, "Successfully restarted from graph\n");
        assert_eq!(service.requested, vec!["pointcloud_backup.zip"]);
    }

    #[tokio::test]
    async fn test_archive_missing() {
        let mut service = TestRestartService::new(Behaviour::Answer(false));

        let (result, out) = invoke_and_report(&mut service, &mut Interrupt::never()).await;

        assert_eq!(result.unwrap(), Outcome::ArchiveMissing);
        assert_eq!(out, "Error: pointcloud_backup.zip missing\n");
    }

    #[tokio::test]
    async fn test_interrupted_while_waiting() {
        let mut service = TestRestartService::new(Behaviour::Hang);
        let (handle, mut interrupt) = Interrupt::channel();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.trigger();
        });

        let (result, out) = invoke_and_report(&mut service, &mut interrupt).await;

        assert_eq!(result.unwrap(), Outcome::Interrupted);
        assert_eq!(out, "");
        assert_eq!(service.requested, vec!["pointcloud_backup.zip"]);
    }

    #[tokio::test]
    async fn test_interrupted_before_request() {
        let mut service = TestRestartService::new(Behaviour::Answer(true));
        let (handle, mut interrupt) = Interrupt::channel();
        handle.trigger();

        let (result, out) = invoke_and_report(&mut service, &mut interrupt).await;

        assert_eq!(result.unwrap(), Outcome::Interrupted);
        assert_eq!(out, "");
        assert!(service.requested.is_empty());
    }

    #[tokio::test]
    async fn test_service_error() {
        let mut service = TestRestartService::new(Behaviour::Fail("connection refused"));

        let (result, out) = invoke_and_report(&mut service, &mut Interrupt::never()).await;

        assert_matches!(result, Err(ErrorMessage("connection refused")));
        assert_eq!(out, "");
    }

    #[test]
    fn test_usage() {
        assert_eq!(usage("restarter"), "Usage: restarter filename.zip");
    }
}
