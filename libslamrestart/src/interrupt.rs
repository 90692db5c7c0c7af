// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! An explicit cancellation signal for long-running blocking operations.
//!
//! An [`Interrupt`](struct.Interrupt.html) is a receiver that can be raced
//! against any future with `tokio::select!`. It is triggered either by hand
//! via an [`InterruptHandle`](struct.InterruptHandle.html) or by the process
//! receiving SIGINT or SIGTERM (see
//! [`Interrupt::from_signals`](struct.Interrupt.html#method.from_signals)).

use std::io;

use futures::future;
use tokio::sync::watch;

/// The receiving side of an interrupt.
#[derive(Clone, Debug)]
pub struct Interrupt {
    rx: watch::Receiver<bool>,
}

/// The triggering side of an interrupt.
#[derive(Debug)]
pub struct InterruptHandle {
    tx: watch::Sender<bool>,
}

impl Interrupt {
    /// Create a new interrupt and a handle that triggers it.
    pub fn channel() -> (InterruptHandle, Interrupt) {
        let (tx, rx) = watch::channel(false);

        (InterruptHandle { tx }, Interrupt { rx })
    }

    /// Create an interrupt that is never triggered.
    pub fn never() -> Interrupt {
        Self::channel().1
    }

    /// Create an interrupt that is triggered when the process receives SIGINT
    /// (or SIGTERM on Unix).
    ///
    /// The signal handlers are installed before this returns, so a signal
    /// raised at any later point triggers the interrupt instead of
    /// terminating the process. This must be called from within a tokio
    /// runtime.
    pub fn from_signals() -> io::Result<Interrupt> {
        let (handle, interrupt) = Self::channel();
        let mut signals = Signals::install()?;

        tokio::spawn(async move {
            if signals.recv().await.is_some() {
                handle.trigger();
            }
        });

        Ok(interrupt)
    }

    /// Whether or not the interrupt has already been triggered.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for the interrupt to be triggered.
    ///
    /// If the handle is dropped without triggering, this never resolves.
    pub async fn triggered(&mut self) {
        loop {
            if self.is_triggered() {
                return;
            }

            if self.rx.changed().await.is_err() {
                future::pending::<()>().await;
            }
        }
    }
}

impl InterruptHandle {
    /// Trigger the interrupt.
    pub fn trigger(&self) {
        // Sending only fails when every receiver is gone, in which case there
        // is nobody left to interrupt.
        let _ = self.tx.send(true);
    }
}

#[cfg(unix)]
struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Signals {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) -> Option<()> {
        tokio::select! {
            received = self.interrupt.recv() => received,
            received = self.terminate.recv() => received,
        }
    }
}

#[cfg(windows)]
struct Signals {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(windows)]
impl Signals {
    fn install() -> io::Result<Self> {
        Ok(Signals {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    async fn recv(&mut self) -> Option<()> {
        self.ctrl_c.recv().await
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn test_trigger() {
        let (handle, mut interrupt) = Interrupt::channel();
        assert!(!interrupt.is_triggered());

        let waiter = {
            let mut interrupt = interrupt.clone();
            tokio::spawn(async move { interrupt.triggered().await })
        };

        handle.trigger();
        timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter was not woken")
            .unwrap();

        assert!(interrupt.is_triggered());
        // A triggered interrupt resolves immediately on every later wait.
        timeout(Duration::from_secs(5), interrupt.triggered())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_trigger_before_wait() {
        let (handle, mut interrupt) = Interrupt::channel();
        handle.trigger();
        drop(handle);

        timeout(Duration::from_secs(5), interrupt.triggered())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_never() {
        let mut interrupt = Interrupt::never();

        assert!(!interrupt.is_triggered());
        assert!(
            timeout(Duration::from_millis(50), interrupt.triggered())
                .await
                .is_err()
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_from_signals_before_listener_runs() {
        use std::process::{self, Command};

        let mut interrupt = Interrupt::from_signals().unwrap();

        // Raised before the listening task has been polled even once.
        let status = Command::new("kill")
            .arg("-TERM")
            .arg(process::id().to_string())
            .status()
            .unwrap();
        assert!(status.success());

        timeout(Duration::from_secs(5), interrupt.triggered())
            .await
            .expect("interrupt was not triggered");
        assert!(interrupt.is_triggered());
    }
}
