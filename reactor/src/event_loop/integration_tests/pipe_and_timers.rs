// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! One second of a 50ms periodic timer running alongside a pipe that gets a byte every
//! 250ms.

use crate::{Activity, Interest, Reactor, ReactorConfig, TimerHandle, TimerKind};
use pretty_assertions::assert_eq;
use rustix::{io::{read, write},
             pipe::pipe};
use std::{cell::RefCell,
          os::fd::{AsRawFd, RawFd},
          rc::Rc,
          time::{Duration, Instant}};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Tick,
    Write,
    Read,
}

type Journal = Rc<RefCell<Vec<(u64, Event)>>>;

#[test]
fn test_one_second_of_ticks_and_pipe_writes() {
    let (read_end, write_end) = pipe().unwrap();
    let journal = Journal::default();
    let mut reactor = Reactor::new(ReactorConfig::default());

    let tick_journal = journal.clone();
    reactor
        .add_timer(
            TimerKind::Periodic,
            50,
            move |reactor: &mut Reactor, _: TimerHandle| {
                tick_journal
                    .borrow_mut()
                    .push((reactor.iteration(), Event::Tick));
            },
        )
        .unwrap();

    let write_journal = journal.clone();
    reactor
        .add_timer(
            TimerKind::Periodic,
            250,
            move |reactor: &mut Reactor, _: TimerHandle| {
                write(&write_end, b"!").unwrap();
                write_journal
                    .borrow_mut()
                    .push((reactor.iteration(), Event::Write));
            },
        )
        .unwrap();

    reactor
        .add_timer(
            TimerKind::Oneshot,
            1_000,
            |reactor: &mut Reactor, _: TimerHandle| reactor.request_stop(),
        )
        .unwrap();

    let read_journal = journal.clone();
    let read_end = Rc::new(read_end);
    let read_end_clone = read_end.clone();
    reactor
        .add_fd(
            read_end.as_raw_fd(),
            Interest::READABLE,
            move |reactor: &mut Reactor, _: RawFd, activity: Activity| {
                assert_eq!(activity, Activity::READABLE);
                let mut buf = [0_u8; 16];
                let count = read(&*read_end_clone, &mut buf[..]).unwrap();
                assert_eq!(count, 1);
                read_journal
                    .borrow_mut()
                    .push((reactor.iteration(), Event::Read));
            },
        )
        .unwrap();

    let start = Instant::now();
    reactor.run().unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(1_000), "{elapsed:?}");

    let journal = journal.borrow();
    let count_of = |wanted: Event| journal.iter().filter(|(_, e)| *e == wanted).count();

    // Deadlines are drift corrected, so a slow machine loses ticks, it never gains them.
    let ticks = count_of(Event::Tick);
    assert!((15..=20).contains(&ticks), "ticks: {ticks}");

    // The stop request ends the iteration before dispatch, so the last write may go
    // unread.
    let writes = count_of(Event::Write);
    let reads = count_of(Event::Read);
    assert!(writes >= 3, "writes: {writes}");
    assert!(reads == writes || reads + 1 == writes, "{reads} reads, {writes} writes");

    // Each read is dispatched in the same iteration as its write, after the timer pass.
    for (index, &(iteration, event)) in journal.iter().enumerate() {
        if event != Event::Read {
            continue;
        }
        let preceding_write = journal[..index]
            .iter()
            .rev()
            .find(|(_, e)| *e == Event::Write);
        assert_eq!(preceding_write.map(|(i, _)| *i), Some(iteration));
        assert!(
            journal[index + 1..]
                .iter()
                .all(|(i, _)| *i > iteration),
            "timer fired after descriptor dispatch in iteration {iteration}"
        );
    }
}

#[test]
fn test_removed_descriptor_is_not_polled() {
    let (read_end, write_end) = pipe().unwrap();
    let mut reactor = Reactor::new(ReactorConfig::default());
    reactor
        .add_fd(
            read_end.as_raw_fd(),
            Interest::READABLE,
            |_: &mut Reactor, _: RawFd, _: Activity| panic!("removed before the write"),
        )
        .unwrap();
    write(&write_end, b"x").unwrap();
    reactor.remove_fd(read_end.as_raw_fd());
    drop(read_end);

    reactor
        .add_timer(
            TimerKind::Oneshot,
            10,
            |reactor: &mut Reactor, _: TimerHandle| reactor.request_stop(),
        )
        .unwrap();

    // Closed after removal, so a stale descriptor error would surface here if it were
    // still in the readiness sets.
    reactor.run().unwrap();
    assert!(reactor.descriptors().is_empty());
}
