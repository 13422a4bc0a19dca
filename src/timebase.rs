//! Wrap-safe elapsed-time arithmetic on the millisecond tick.
//!
//! The tick counter is a free-running `u32` that wraps at `u32::MAX`
//! (about 49.7 days). Unsigned wrapping subtraction yields the correct
//! elapsed interval across the wrap, so long as the real interval is
//! shorter than half the counter period.

/// Milliseconds elapsed from `prev` to `now`, wrap-safe.
#[inline]
pub fn elapsed_ms(prev: u32, now: u32) -> u32 {
    now.wrapping_sub(prev)
}
