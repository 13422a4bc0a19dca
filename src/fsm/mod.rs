//! Function-pointer mode state machine.
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │  ModeTable                                     │
//! │  ┌───────────┬───────────┬───────────────────┐ │
//! │  │ ModeId    │ on_enter  │ on_update         │ │
//! │  ├───────────┼───────────┼───────────────────┤ │
//! │  │ Manual    │ fn(ctx)   │ fn(ctx)->Option<> │ │
//! │  │ Automatic │ fn(ctx)   │ fn(ctx)->Option<> │ │
//! │  └───────────┴───────────┴───────────────────┘ │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! Each control cycle the engine calls `on_update` for the current mode.
//! If it returns `Some(next)`, the engine runs `on_enter` for the next
//! mode and switches the current pointer. Handlers receive
//! `&mut CycleContext`, which holds this cycle's inputs and sample plus
//! the persistent loop state (speed, setpoint, filter, controller).

pub mod context;
pub mod states;

use context::CycleContext;
use log::info;

use crate::config::StartMode;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// The two operating modes. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ModeId {
    /// Direct speed control from the panel buttons.
    Manual = 0,
    /// Closed-loop pressure regulation.
    Automatic = 1,
}

impl ModeId {
    /// Total number of modes — sizes the table array.
    pub const COUNT: usize = 2;

    /// Convert a table index back to `ModeId`. Panics on out-of-range in
    /// debug builds; falls back to `Manual` (open-loop, operator-driven)
    /// in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Manual,
            1 => Self::Automatic,
            _ => {
                debug_assert!(false, "invalid mode index: {idx}");
                Self::Manual
            }
        }
    }
}

impl From<StartMode> for ModeId {
    fn from(mode: StartMode) -> Self {
        match mode {
            StartMode::Manual => Self::Manual,
            StartMode::Automatic => Self::Automatic,
        }
    }
}

// ---------------------------------------------------------------------------
// Mode descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Signature for the `on_enter` action, run once per transition.
pub type ModeActionFn = fn(&mut CycleContext);

/// Signature for the per-cycle update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type ModeUpdateFn = fn(&mut CycleContext) -> Option<ModeId>;

/// Static descriptor for a single mode. Stored in a fixed array — no
/// heap, no `dyn`.
pub struct ModeDescriptor {
    pub id: ModeId,
    pub name: &'static str,
    pub on_enter: Option<ModeActionFn>,
    pub on_update: ModeUpdateFn,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The mode state machine engine.
pub struct Fsm {
    table: [ModeDescriptor; ModeId::COUNT],
    current: usize,
}

impl Fsm {
    /// Construct with the given table, starting in `initial`.
    pub fn new(table: [ModeDescriptor; ModeId::COUNT], initial: ModeId) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting mode. Call once after
    /// construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut CycleContext) {
        info!("mode machine starting in {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance by one control cycle.
    pub fn tick(&mut self, ctx: &mut CycleContext) {
        let next = (self.table[self.current].on_update)(ctx);
        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// The current mode's identity.
    pub fn current_mode(&self) -> ModeId {
        ModeId::from_index(self.current)
    }

    fn transition(&mut self, next_id: ModeId, ctx: &mut CycleContext) {
        let next_idx = next_id as usize;
        info!(
            "mode transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );
        self.current = next_idx;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::context::CycleContext;
    use super::*;
    use crate::config::RegulatorConfig;
    use crate::control::median::WINDOW_LEN;
    use crate::drivers::buttons::InputEdges;

    fn make_ctx() -> CycleContext {
        CycleContext::new(RegulatorConfig::default())
    }

    fn make_fsm(initial: ModeId) -> Fsm {
        Fsm::new(states::build_mode_table(), initial)
    }

    fn cycle(fsm: &mut Fsm, ctx: &mut CycleContext, now_ms: u32, sample: Option<u16>) {
        ctx.now_ms = now_ms;
        ctx.sample = sample;
        ctx.commands.clear();
        fsm.tick(ctx);
        ctx.inputs = InputEdges::default();
    }

    #[test]
    fn starts_in_configured_mode() {
        assert_eq!(make_fsm(ModeId::Manual).current_mode(), ModeId::Manual);
        assert_eq!(
            make_fsm(ModeId::Automatic).current_mode(),
            ModeId::Automatic
        );
    }

    #[test]
    fn manual_speed_follows_button_events() {
        let mut fsm = make_fsm(ModeId::Manual);
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        ctx.speed_percent = 30;

        ctx.inputs.increase = true;
        cycle(&mut fsm, &mut ctx, 100, Some(40));
        assert_eq!(ctx.speed_percent, 35);

        for i in 0..2 {
            ctx.inputs.decrease = true;
            cycle(&mut fsm, &mut ctx, 200 + i * 100, Some(40));
        }
        assert_eq!(ctx.speed_percent, 25);
        assert_eq!(ctx.commands.speed, Some(25));
    }

    #[test]
    fn manual_speed_clamps_at_bounds() {
        let mut fsm = make_fsm(ModeId::Manual);
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        ctx.speed_percent = 98;
        ctx.inputs.increase = true;
        cycle(&mut fsm, &mut ctx, 100, Some(40));
        assert_eq!(ctx.speed_percent, 100);

        ctx.speed_percent = 2;
        ctx.inputs.decrease = true;
        cycle(&mut fsm, &mut ctx, 200, Some(40));
        assert_eq!(ctx.speed_percent, 0);
    }

    #[test]
    fn manual_commands_speed_every_cycle() {
        let mut fsm = make_fsm(ModeId::Manual);
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        ctx.speed_percent = 40;

        for t in 0..5u32 {
            cycle(&mut fsm, &mut ctx, t * 100, Some(40));
            assert_eq!(ctx.commands.speed, Some(40));
        }
    }

    #[test]
    fn mode_event_toggles_between_modes() {
        let mut fsm = make_fsm(ModeId::Manual);
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        ctx.inputs.mode = true;
        cycle(&mut fsm, &mut ctx, 100, Some(40));
        assert_eq!(fsm.current_mode(), ModeId::Automatic);

        ctx.inputs.mode = true;
        cycle(&mut fsm, &mut ctx, 200, Some(40));
        assert_eq!(fsm.current_mode(), ModeId::Manual);
    }

    #[test]
    fn entering_automatic_resets_loop_state() {
        let mut fsm = make_fsm(ModeId::Manual);
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        // Dirty the loop state.
        for _ in 0..WINDOW_LEN {
            let _ = ctx.filter.push(77);
        }
        let _ = ctx.pid.step(100.0, 20.0, 500);
        ctx.last_sample_ms = Some(123);

        ctx.inputs.mode = true;
        cycle(&mut fsm, &mut ctx, 100, Some(40));
        assert_eq!(fsm.current_mode(), ModeId::Automatic);
        assert!(ctx.filter.is_empty());
        assert_eq!(ctx.pid.integral(), 0.0);
        assert_eq!(ctx.pid.last_error(), 0.0);
        assert_eq!(ctx.last_sample_ms, None);
    }

    #[test]
    fn automatic_adjusts_desired_with_clamps() {
        let mut fsm = make_fsm(ModeId::Automatic);
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        ctx.desired = 118;
        ctx.inputs.increase = true;
        cycle(&mut fsm, &mut ctx, 100, Some(40));
        assert_eq!(ctx.desired, 120);

        ctx.desired = 3;
        ctx.inputs.decrease = true;
        cycle(&mut fsm, &mut ctx, 200, Some(40));
        assert_eq!(ctx.desired, 0);
    }

    #[test]
    fn automatic_warm_up_withholds_actuation() {
        let mut fsm = make_fsm(ModeId::Automatic);
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        for i in 0..(WINDOW_LEN as u32 - 1) {
            cycle(&mut fsm, &mut ctx, i * 100, Some(40));
            assert_eq!(ctx.commands.speed, None, "cycle {i} actuated during warm-up");
        }
        // Window fills on the 11th sample.
        cycle(&mut fsm, &mut ctx, 1100, Some(40));
        assert!(ctx.commands.speed.is_some());
    }

    #[test]
    fn sensor_fault_freezes_filter_and_controller() {
        let mut fsm = make_fsm(ModeId::Automatic);
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        for i in 0..3u32 {
            cycle(&mut fsm, &mut ctx, i * 100, Some(40));
        }
        let filter_len = ctx.filter.len();
        let integral = ctx.pid.integral();
        let stamp = ctx.last_sample_ms;

        for i in 3..6u32 {
            cycle(&mut fsm, &mut ctx, i * 100, None);
            assert_eq!(ctx.commands.speed, None);
            assert!(ctx.commands.line2.contains("FAULT"));
        }
        assert_eq!(ctx.filter.len(), filter_len);
        assert_eq!(ctx.pid.integral(), integral);
        assert_eq!(ctx.last_sample_ms, stamp);
    }

    #[test]
    fn automatic_regulates_once_window_is_ready() {
        let mut fsm = make_fsm(ModeId::Automatic);
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        ctx.desired = 80;

        // Pressure well below the setpoint: expect a strong command.
        for i in 0..(WINDOW_LEN as u32 + 3) {
            cycle(&mut fsm, &mut ctx, i * 100, Some(20));
        }
        let speed = ctx.commands.speed.expect("regulating");
        assert!(speed > 50, "expected hard drive toward setpoint, got {speed}");
    }

    #[test]
    fn timestamp_advances_only_on_valid_samples() {
        let mut fsm = make_fsm(ModeId::Automatic);
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        cycle(&mut fsm, &mut ctx, 100, Some(40));
        assert_eq!(ctx.last_sample_ms, Some(100));
        cycle(&mut fsm, &mut ctx, 200, None);
        assert_eq!(ctx.last_sample_ms, Some(100));
        cycle(&mut fsm, &mut ctx, 300, Some(40));
        assert_eq!(ctx.last_sample_ms, Some(300));
    }
}
