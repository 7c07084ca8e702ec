// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The daemon's diagnostic sink: a printf-like template with up to
//! [`MAX_SUBSTITUTIONS`] `%s` markers, always reported at warning level.
//!
//! Where the line ends up (stderr prefixed by the command name, or the system log) is
//! decided by the installed [`TracingConfig`], not here.
//!
//! [`TracingConfig`]: crate::log::TracingConfig

pub const MAX_SUBSTITUTIONS: usize = 3;

const MARKER: &str = "%s";

/// Replaces the first [`MAX_SUBSTITUTIONS`] `%s` markers in `template` with `subs`, in
/// order. A marker without a matching substitution becomes empty. Markers past the
/// limit, and substitutions past the limit, are left alone.
#[must_use]
pub fn expand_template(template: &str, subs: &[&str]) -> String {
    let mut acc = String::with_capacity(template.len());
    let mut rest = template;

    for index in 0..MAX_SUBSTITUTIONS {
        let Some(pos) = rest.find(MARKER) else {
            break;
        };
        acc.push_str(&rest[..pos]);
        acc.push_str(subs.get(index).copied().unwrap_or_default());
        rest = &rest[pos + MARKER.len()..];
    }

    acc.push_str(rest);
    acc
}

/// Expands `template` and emits it as a warning.
pub fn report(template: &str, subs: &[&str]) {
    let line = expand_template(template, subs);
    tracing::warn!(message = %line);
}
