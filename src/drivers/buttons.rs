//! Debounce and edge classification for the three operator buttons.
//!
//! The panel buttons are raw momentary inputs sampled once per control
//! cycle; debounce is a minimum hold-off interval after an accepted
//! press rather than dedicated hardware.
//!
//! Increase/decrease auto-repeat at the hold-off interval while held
//! (holding the button keeps stepping the value). The mode toggle is
//! strictly edge-triggered: it fires once per press and must see a
//! release first, so a held button can never oscillate the mode.

use crate::app::ports::RawInputs;
use crate::timebase::elapsed_ms;

/// Events classified from this cycle's input levels
/// ("pressed this cycle", not "currently held").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputEdges {
    pub increase: bool,
    pub decrease: bool,
    pub mode: bool,
}

impl InputEdges {
    pub fn any(&self) -> bool {
        self.increase || self.decrease || self.mode
    }
}

/// Auto-repeating button: fires on press, then again each time the
/// hold-off interval elapses while still held.
#[derive(Debug, Clone, Copy, Default)]
struct RepeatButton {
    last_fire_ms: u32,
    fired_once: bool,
}

impl RepeatButton {
    fn poll(&mut self, down: bool, now_ms: u32, holdoff_ms: u32) -> bool {
        if !down {
            return false;
        }
        if self.fired_once && elapsed_ms(self.last_fire_ms, now_ms) < holdoff_ms {
            return false;
        }
        self.last_fire_ms = now_ms;
        self.fired_once = true;
        true
    }
}

/// Edge-only button: fires on the down transition, never while held.
#[derive(Debug, Clone, Copy, Default)]
struct EdgeButton {
    was_down: bool,
    last_fire_ms: u32,
    fired_once: bool,
}

impl EdgeButton {
    fn poll(&mut self, down: bool, now_ms: u32, holdoff_ms: u32) -> bool {
        let settled = !self.fired_once || elapsed_ms(self.last_fire_ms, now_ms) >= holdoff_ms;
        let fire = down && !self.was_down && settled;
        self.was_down = down;
        if fire {
            self.last_fire_ms = now_ms;
            self.fired_once = true;
        }
        fire
    }
}

/// The three-button operator pad.
#[derive(Debug, Clone, Copy)]
pub struct ButtonPad {
    increase: RepeatButton,
    decrease: RepeatButton,
    mode: EdgeButton,
    holdoff_ms: u32,
}

impl ButtonPad {
    pub fn new(holdoff_ms: u32) -> Self {
        Self {
            increase: RepeatButton::default(),
            decrease: RepeatButton::default(),
            mode: EdgeButton::default(),
            holdoff_ms,
        }
    }

    /// Classify this cycle's raw levels into events.
    pub fn poll(&mut self, raw: RawInputs, now_ms: u32) -> InputEdges {
        InputEdges {
            increase: self.increase.poll(raw.increase, now_ms, self.holdoff_ms),
            decrease: self.decrease.poll(raw.decrease, now_ms, self.holdoff_ms),
            mode: self.mode.poll(raw.mode, now_ms, self.holdoff_ms),
        }
    }
}
