// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

bitflags::bitflags! {
    /// What a descriptor wants to be woken up for. Combine with bitwise OR:
    /// `Interest::READABLE | Interest::WRITABLE`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Interest: u8 {
        const READABLE    = 1 << 0;
        const WRITABLE    = 1 << 1;
        const EXCEPTIONAL = 1 << 2;
    }
}

bitflags::bitflags! {
    /// What the readiness wait observed on a descriptor. Passed to
    /// [`IoHandler::on_activity()`]. Never empty when a handler sees it.
    ///
    /// [`IoHandler::on_activity()`]: crate::IoHandler::on_activity
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Activity: u8 {
        const READABLE    = 1 << 0;
        const WRITABLE    = 1 << 1;
        const EXCEPTIONAL = 1 << 2;
    }
}

impl Activity {
    /// Activity restricted to the kinds `interest` asked for.
    #[must_use]
    pub fn masked_by(self, interest: Interest) -> Self {
        Self::from_bits_truncate(self.bits() & interest.bits())
    }

    /// Every kind of activity that `interest` asked for. Used when the kernel reports a
    /// hangup or error, which wakes up whatever the descriptor was waiting on.
    #[must_use]
    pub fn all_of(interest: Interest) -> Self { Self::from_bits_truncate(interest.bits()) }
}
