// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::io;

use slog::{o, Drain, Logger, OwnedKVList, Record};
use slog_term::{Decorator, PlainSyncDecorator, RecordDecorator, TestStdoutWriter};

/// Generate loggers for testing.
///
/// Each line is prefixed with the process that logged it.
pub fn build_test_loggers() -> (Logger, Logger) {
    (
        build_test_logger(Process::FakeSlam),
        build_test_logger(Process::Restarter),
    )
}

fn build_test_logger(process: Process) -> Logger {
    let decorator = ProcessDecorator {
        inner: PlainSyncDecorator::new(TestStdoutWriter),
        process,
    };

    Logger::root(slog_term::FullFormat::new(decorator).build().fuse(), o! {})
}

#[derive(Clone, Copy)]
enum Process {
    FakeSlam,
    Restarter,
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Process::FakeSlam => f.write_str("fakeslam"),
            Process::Restarter => f.write_str("restarter"),
        }
    }
}

struct ProcessDecorator<D> {
    inner: D,
    process: Process,
}

impl<D> Decorator for ProcessDecorator<D>
where
    D: Decorator,
{
    fn with_record<F>(&self, record: &Record, logger_values: &OwnedKVList, f: F) -> io::Result<()>
    where
        F: FnOnce(&mut dyn RecordDecorator) -> io::Result<()>,
    {
        self.inner
            .with_record(record, logger_values, |record_decorator| {
                record_decorator.reset()?;
                write!(record_decorator, "[{:9}] ", self.process)?;
                f(record_decorator)
            })
    }
}
