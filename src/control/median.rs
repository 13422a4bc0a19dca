//! Sliding-window median filter for the pressure sensor.
//!
//! The sensor's dominant noise is outlier spikes, not symmetric jitter,
//! so a median rejects glitches without the lag penalty of a low-pass.
//! An 11-sample window tolerates up to 5 consecutive outliers and keeps
//! the median unambiguous (odd length).
//!
//! The window refuses to produce a value until it has filled:
//! [`MedianFilter::value`] returns `None` during warm-up and callers
//! must handle the refusal rather than consume a half-initialised
//! window.

/// Window capacity. Odd, so the sorted middle element is the median.
pub const WINDOW_LEN: usize = 11;

/// Fixed-capacity circular window over the last [`WINDOW_LEN`] samples.
#[derive(Debug, Clone)]
pub struct MedianFilter {
    window: [u16; WINDOW_LEN],
    /// Slot the next sample lands in (oldest entry once full).
    next: usize,
    /// Samples accumulated, saturating at `WINDOW_LEN`.
    filled: usize,
}

impl MedianFilter {
    pub fn new() -> Self {
        Self {
            window: [0; WINDOW_LEN],
            next: 0,
            filled: 0,
        }
    }

    /// Insert the newest sample, evicting the oldest once the window is
    /// full. Returns whether the window is ready to produce a median.
    pub fn push(&mut self, sample: u16) -> bool {
        self.window[self.next] = sample;
        self.next = (self.next + 1) % WINDOW_LEN;
        if self.filled < WINDOW_LEN {
            self.filled += 1;
        }
        self.is_ready()
    }

    /// Whether a full window's worth of samples has accumulated.
    pub fn is_ready(&self) -> bool {
        self.filled == WINDOW_LEN
    }

    /// Median of the window contents, or `None` while warming up.
    pub fn value(&self) -> Option<u16> {
        if !self.is_ready() {
            return None;
        }
        let mut sorted = self.window;
        sorted.sort_unstable();
        Some(sorted[WINDOW_LEN / 2])
    }

    /// Discard all accumulated samples (used on mode transition).
    pub fn clear(&mut self) {
        self.next = 0;
        self.filled = 0;
    }

    /// Samples currently held (saturates at [`WINDOW_LEN`]).
    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }
}

impl Default for MedianFilter {
    fn default() -> Self {
        Self::new()
    }
}
