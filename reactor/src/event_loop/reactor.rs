// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`Reactor`] ties the descriptor table, the timer table and the clock together and
//! drives them one iteration at a time. See the [crate docs] for the shape of an
//! iteration and the ordering guarantees.
//!
//! [crate docs]: crate#one-loop-iteration

use crate::{Clock, CommonResult, Continuation, DescriptorTable, ExhaustionPolicy,
            Interest, IoHandler, Micros, MonotonicClock, PluginSlot, ReactorConfig,
            ReactorError, SlotTable, TimerHandle, TimerHandler, TimerKind, TimerTable,
            block_until_ready, dispatch_ready, expire_and_reschedule,
            log::diag_sink, terminate_process, WaitOutcome};
use std::{fmt::{Debug, Formatter},
          os::fd::RawFd,
          rc::Rc};

/// Single threaded readiness reactor.
///
/// There is no global instance. Construct as many as you like; each owns its own tables
/// and clock. The type is `!Send` because handlers aren't required to be.
pub struct Reactor {
    config: ReactorConfig,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) descriptors: DescriptorTable,
    pub(crate) timers: TimerTable,
    plugin_slots: Option<Rc<SlotTable>>,
    stop_requested: bool,
    iteration: u64,
}

impl Debug for Reactor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reactor")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("descriptors", &self.descriptors.len())
            .field("timers", &self.timers.active_count())
            .field("has_plugin_slots", &self.plugin_slots.is_some())
            .field("stop_requested", &self.stop_requested)
            .field("iteration", &self.iteration)
            .finish()
    }
}

impl Reactor {
    /// A reactor on the wall clock.
    #[must_use]
    pub fn new(config: ReactorConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }

    /// A reactor on the given clock. Tests pass a [`ManualClock`].
    ///
    /// [`ManualClock`]: crate::ManualClock
    #[must_use]
    pub fn with_clock(config: ReactorConfig, clock: impl Clock + 'static) -> Self {
        Self {
            config,
            clock: Box::new(clock),
            descriptors: DescriptorTable::new(config.max_descriptors),
            timers: TimerTable::new(config.max_timers),
            plugin_slots: None,
            stop_requested: false,
            iteration: 0,
        }
    }

    /// Gives handlers read access to the host's plugin slot table through
    /// [`Self::slot_by_id()`]. The host keeps ownership.
    #[must_use]
    pub fn with_plugin_slots(mut self, plugin_slots: Rc<SlotTable>) -> Self {
        self.plugin_slots = Some(plugin_slots);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ReactorConfig { &self.config }

    #[must_use]
    pub fn descriptors(&self) -> &DescriptorTable { &self.descriptors }

    #[must_use]
    pub fn timers(&self) -> &TimerTable { &self.timers }

    #[must_use]
    pub fn now_micros(&self) -> Micros { self.clock.now_micros() }

    /// Number of completed loop iterations.
    #[must_use]
    pub fn iteration(&self) -> u64 { self.iteration }

    // ╭──────────────────────────────────────────────────────────╮
    // │ Descriptor registration                                  │
    // ╰──────────────────────────────────────────────────────────╯

    /// Watches `fd` for `interest`; `handler` runs whenever the readiness wait reports
    /// matching activity. Registering a descriptor that is already watched replaces its
    /// interest and handler.
    ///
    /// # Errors
    ///
    /// - [`ReactorError::InvalidDescriptor`] if `fd` isn't positive.
    /// - [`ReactorError::DescriptorTableFull`] if the table is full and the policy is
    ///   [`ExhaustionPolicy::Recoverable`]. Under [`ExhaustionPolicy::FailFast`] the
    ///   process exits instead.
    pub fn add_fd(
        &mut self,
        fd: RawFd,
        interest: Interest,
        handler: impl IoHandler + 'static,
    ) -> CommonResult<()> {
        match self.descriptors.add(fd, interest, Box::new(handler)) {
            Ok(slot) => {
                tracing::debug!(message = "Descriptor registered", fd, slot, interest = ?interest);
                Ok(())
            }
            Err(error) => Err(self.registration_failed(error).into()),
        }
    }

    /// Stops watching `fd`. Unknown descriptors are ignored.
    pub fn remove_fd(&mut self, fd: RawFd) {
        if self.descriptors.remove(fd) {
            tracing::debug!(message = "Descriptor removed", fd);
        }
    }

    // ╭──────────────────────────────────────────────────────────╮
    // │ Timer registration                                       │
    // ╰──────────────────────────────────────────────────────────╯

    /// Schedules `handler` to run `delay_ms` from now; once for [`TimerKind::Oneshot`],
    /// every `delay_ms` for [`TimerKind::Periodic`]. The longest delay is `u32::MAX`
    /// milliseconds, about 49.7 days.
    ///
    /// # Errors
    ///
    /// - [`ReactorError::ZeroPeriod`] for a periodic timer with `delay_ms == 0`.
    /// - [`ReactorError::TimerTableFull`] if the table is full and the policy is
    ///   [`ExhaustionPolicy::Recoverable`]. Under [`ExhaustionPolicy::FailFast`] the
    ///   process exits instead.
    pub fn add_timer(
        &mut self,
        kind: TimerKind,
        delay_ms: u32,
        handler: impl TimerHandler + 'static,
    ) -> Result<TimerHandle, ReactorError> {
        let now = self.clock.now_micros();
        match self.timers.add(kind, delay_ms, now, Box::new(handler)) {
            Ok(handle) => {
                tracing::debug!(message = "Timer added", %handle, %kind, delay_ms);
                Ok(handle)
            }
            Err(error) => Err(self.registration_failed(error)),
        }
    }

    /// Cancels a timer. Stale, out of range and already released handles are ignored.
    pub fn remove_timer(&mut self, handle: TimerHandle) {
        if self.timers.remove(handle) {
            tracing::debug!(message = "Timer removed", %handle);
        }
    }

    /// Reports a declined registration, and applies the exhaustion policy.
    fn registration_failed(&self, error: ReactorError) -> ReactorError {
        // Fatal exhaustion is logged once, by `terminate_process()`.
        if error.is_exhaustion() && self.config.exhaustion_policy == ExhaustionPolicy::FailFast
        {
            terminate_process(&error);
        }

        match &error {
            ReactorError::InvalidDescriptor { fd } => {
                diag_sink::report("Declined descriptor %s", &[&fd.to_string()]);
            }
            ReactorError::ZeroPeriod => {
                diag_sink::report("Periodic timer with period = 0", &[]);
            }
            ReactorError::DescriptorTableFull { capacity } => {
                diag_sink::report(
                    "No more file descriptors available (capacity %s)",
                    &[&capacity.to_string()],
                );
            }
            ReactorError::TimerTableFull { capacity } => {
                diag_sink::report("No free timers (capacity %s)", &[&capacity.to_string()]);
            }
            ReactorError::ReadinessWait(_) | ReactorError::StaleDescriptor { .. } => {}
        }

        error
    }

    // ╭──────────────────────────────────────────────────────────╮
    // │ Plugin slots                                             │
    // ╰──────────────────────────────────────────────────────────╯

    /// Read only lookup into the host's plugin slot table. `None` if `id` is out of
    /// range or no table was attached with [`Self::with_plugin_slots()`].
    #[must_use]
    pub fn slot_by_id(&self, id: usize) -> Option<&PluginSlot> {
        self.plugin_slots.as_deref()?.lookup(id)
    }

    // ╭──────────────────────────────────────────────────────────╮
    // │ The loop                                                 │
    // ╰──────────────────────────────────────────────────────────╯

    /// Asks the loop to wind down. Takes effect at the end of the current step of
    /// [`Self::run_once()`]: after the timer pass if called from a timer handler, after
    /// dispatch if called from a descriptor handler.
    pub fn request_stop(&mut self) { self.stop_requested = true; }

    #[must_use]
    pub fn is_stop_requested(&self) -> bool { self.stop_requested }

    /// Runs exactly one iteration: fire due timers, wait for readiness (bounded by the
    /// next timer deadline), then dispatch ready descriptors.
    ///
    /// Returns [`Continuation::Stop`] once a handler has called
    /// [`Self::request_stop()`].
    ///
    /// # Errors
    ///
    /// Any failure of the readiness wait other than `EINTR`. These are not recoverable;
    /// [`Self::run_or_exit()`] terminates the process on them.
    pub fn run_once(&mut self) -> Result<Continuation, ReactorError> {
        let wait_bound = expire_and_reschedule(self);

        if self.stop_requested {
            self.iteration += 1;
            return Ok(Continuation::Stop);
        }

        let watch = self.descriptors.readiness().clone();
        match block_until_ready(&watch, wait_bound)? {
            WaitOutcome::Interrupted => {}
            WaitOutcome::Ready(ready) => {
                dispatch_ready(self, &ready);
            }
        }

        self.iteration += 1;
        Ok(if self.stop_requested {
            Continuation::Stop
        } else {
            Continuation::Continue
        })
    }

    /// Loops over [`Self::run_once()`] until a handler requests a stop. The stop request
    /// is consumed, so `run()` can be called again.
    ///
    /// # Errors
    ///
    /// See [`Self::run_once()`].
    pub fn run(&mut self) -> Result<(), ReactorError> {
        tracing::debug!(
            message = "Reactor loop starting",
            descriptors = self.descriptors.len(),
            timers = self.timers.active_count()
        );
        loop {
            if self.run_once()? == Continuation::Stop {
                self.stop_requested = false;
                tracing::debug!(message = "Reactor loop stopped", iteration = self.iteration);
                return Ok(());
            }
        }
    }

    /// [`Self::run()`], terminating the process with [`FATAL_EXIT_CODE`] if the loop
    /// fails.
    ///
    /// [`FATAL_EXIT_CODE`]: crate::FATAL_EXIT_CODE
    pub fn run_or_exit(&mut self) {
        if let Err(error) = self.run() {
            terminate_process(&error);
        }
    }
}
