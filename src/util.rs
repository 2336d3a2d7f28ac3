//! Timestamp and errno helpers for trace post-processing

use nix::errno::Errno;

pub const NSECS_PER_SEC: u64 = 1_000_000_000;

/// Combine seconds and nanoseconds into total nanoseconds
///
/// `None` when the total does not fit in a `u64` (past roughly year 2554).
pub fn nsecs(secs: u64, nanosecs: u64) -> Option<u64> {
    secs.checked_mul(NSECS_PER_SEC)?.checked_add(nanosecs)
}

/// Whole seconds part of a nanosecond timestamp
pub fn nsecs_secs(nanosecs: u64) -> u64 {
    nanosecs / NSECS_PER_SEC
}

/// Sub-second part of a nanosecond timestamp
pub fn nsecs_nsecs(nanosecs: u64) -> u64 {
    nanosecs % NSECS_PER_SEC
}

/// Format a nanosecond timestamp as `sssss.nnnnnnnnn`
pub fn nsecs_str(nanosecs: u64) -> String {
    format!("{:5}.{:09}", nsecs_secs(nanosecs), nsecs_nsecs(nanosecs))
}

/// Symbolic name of an errno value (sign ignored), e.g. `-2` -> `ENOENT`
pub fn strerror(errno: i64) -> String {
    let known = i32::try_from(errno.unsigned_abs())
        .ok()
        .map(Errno::from_raw)
        .filter(|e| *e != Errno::UnknownErrno);
    match known {
        Some(e) => format!("{:?}", e),
        None => format!("Unknown {} errno", errno),
    }
}
