// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::io;

use chrono::Utc;
use slog::{Drain, Key, Logger, OwnedKVList, Record, Serializer, KV};
use slog_term::{Decorator, RecordDecorator, TermDecorator};

// RFC3339 timestamp with millisecond precision.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3fZ";

/// Create a logger that writes to stderr.
///
/// Stdout is left alone so that it only ever carries the operator-facing
/// result of a command.
pub fn build_logger() -> Logger {
    let decorator = TermDecorator::new().stderr().force_plain().build();
    let drain = MultiLineDrain::new(decorator).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Logger::root(drain, slog::o! {})
}

/// A drain that writes the record header on one line and each key-value pair
/// on its own indented line beneath it.
pub struct MultiLineDrain<D> {
    decorator: D,
}

impl<D> MultiLineDrain<D>
where
    D: Decorator,
{
    pub fn new(decorator: D) -> Self {
        MultiLineDrain { decorator }
    }
}

impl<D> Drain for MultiLineDrain<D>
where
    D: Decorator,
{
    type Ok = ();
    type Err = io::Error;

    fn log(&self, record: &Record, values: &OwnedKVList) -> Result<Self::Ok, Self::Err> {
        self.decorator
            .with_record(record, values, |record_decorator| {
                record_decorator.start_timestamp()?;
                write!(record_decorator, "{}", Utc::now().format(TIMESTAMP_FORMAT))?;

                record_decorator.start_whitespace()?;
                write!(record_decorator, " ")?;

                record_decorator.start_level()?;
                write!(record_decorator, "{}", record.level().as_str())?;

                record_decorator.start_whitespace()?;
                write!(record_decorator, " ")?;

                record_decorator.start_msg()?;
                write!(record_decorator, "{}", record.msg())?;

                record_decorator.start_whitespace()?;
                writeln!(record_decorator)?;

                let mut serializer = MultiLineSerializer { record_decorator };
                record.kv().serialize(record, &mut serializer)?;
                values.serialize(record, &mut serializer)?;

                Ok(())
            })
    }
}

/// A serializer that writes each key-value pair on its own line.
///
/// Every numeric and boolean value falls through to `emit_arguments`; only
/// strings need special handling, since multi-line strings are written as an
/// indented block under their key.
struct MultiLineSerializer<'a> {
    record_decorator: &'a mut dyn RecordDecorator,
}

impl<'a> MultiLineSerializer<'a> {
    fn emit_key(&mut self, key: Key) -> io::Result<()> {
        self.record_decorator.start_whitespace()?;
        write!(self.record_decorator, "  ")?;
        self.record_decorator.start_key()?;
        write!(self.record_decorator, "{}", key)?;
        self.record_decorator.start_separator()?;
        write!(self.record_decorator, ":")
    }

    fn emit_value(&mut self, indent: &str, val: &dyn fmt::Display) -> io::Result<()> {
        self.record_decorator.start_whitespace()?;
        write!(self.record_decorator, "{}", indent)?;
        self.record_decorator.start_value()?;
        write!(self.record_decorator, "{}", val)?;
        self.record_decorator.start_whitespace()?;
        writeln!(self.record_decorator)
    }
}

impl<'a> Serializer for MultiLineSerializer<'a> {
    fn emit_arguments(&mut self, key: Key, val: &fmt::Arguments) -> slog::Result {
        self.emit_key(key)?;
        self.emit_value(" ", val)?;

        Ok(())
    }

    fn emit_str(&mut self, key: Key, val: &str) -> slog::Result {
        if !val.contains('\n') {
            return self.emit_arguments(key, &format_args!("{}", val));
        }

        self.emit_key(key)?;
        self.record_decorator.start_whitespace()?;
        writeln!(self.record_decorator)?;

        for line in val.lines() {
            self.emit_value("    ", &line)?;
        }

        Ok(())
    }
}
