// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words SIGTERM SIGINT

//! Turns termination signals into a graceful reactor stop.
//!
//! `signal-hook` writes one byte into a socket pair from inside the signal handler. The
//! read end is an ordinary registered descriptor, so the stop request arrives through
//! the readiness wait like any other I/O and the handler runs on the reactor thread.

use super::Plugin;
use eedd_reactor::{Activity, CommonResult, Interest, Reactor};
use miette::IntoDiagnostic;
use signal_hook::{SigId,
                  consts::{SIGINT, SIGTERM},
                  low_level};
use std::{io::{ErrorKind, Read},
          os::{fd::{AsRawFd, RawFd},
               unix::net::UnixStream}};

#[derive(Debug)]
pub struct SignalWatch {
    signals: Vec<i32>,
    registered: Vec<SigId>,
}

impl Default for SignalWatch {
    fn default() -> Self { Self::new(&[SIGTERM, SIGINT]) }
}

impl SignalWatch {
    #[must_use]
    pub fn new(signals: &[i32]) -> Self {
        Self {
            signals: signals.to_vec(),
            registered: Vec::new(),
        }
    }
}

impl Drop for SignalWatch {
    fn drop(&mut self) {
        for id in self.registered.drain(..) {
            low_level::unregister(id);
        }
    }
}

impl Plugin for SignalWatch {
    fn name(&self) -> &'static str { "signal_watch" }

    fn description(&self) -> &'static str { "Stops the daemon on SIGTERM or SIGINT" }

    fn initialize(&mut self, reactor: &mut Reactor, _slot_id: usize) -> CommonResult<()> {
        let (mut read_end, write_end) = UnixStream::pair().into_diagnostic()?;
        read_end.set_nonblocking(true).into_diagnostic()?;
        write_end.set_nonblocking(true).into_diagnostic()?;

        for &signal in &self.signals {
            let sender = write_end.try_clone().into_diagnostic()?;
            let id = low_level::pipe::register(signal, sender).into_diagnostic()?;
            self.registered.push(id);
        }

        let fd = read_end.as_raw_fd();
        reactor.add_fd(
            fd,
            Interest::READABLE,
            move |reactor: &mut Reactor, _: RawFd, _: Activity| {
                let pending = drain(&mut read_end);
                tracing::info!(message = "Termination signal received, stopping", pending);
                reactor.request_stop();
            },
        )
    }
}

/// Empties the socket without blocking and returns how many bytes were in it.
fn drain(stream: &mut UnixStream) -> usize {
    let mut total = 0;
    let mut buf = [0_u8; 32];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => return total,
            Ok(count) => total += count,
            Err(error) if error.kind() == ErrorKind::Interrupted => {}
            Err(error) => {
                if error.kind() != ErrorKind::WouldBlock {
                    tracing::warn!(message = "Can't drain signal pipe", error = ?error);
                }
                return total;
            }
        }
    }
}
