//! Concrete mode handlers and table builder.
//!
//! ```text
//!  MANUAL ◀──[mode button]──▶ AUTOMATIC
//!
//!  Manual:    buttons step the speed command directly; the drive is
//!             commanded every cycle.
//!  Automatic: buttons step the pressure setpoint; the sensor reading
//!             runs through median filter and PID to produce the speed.
//! ```
//!
//! Handlers are plain `fn` pointers over [`CycleContext`] — no closures,
//! no dynamic dispatch, no heap.

use core::fmt::Write as _;

use log::info;

use super::context::CycleContext;
use super::{ModeDescriptor, ModeId};
use crate::timebase::elapsed_ms;

/// Build the static mode table. Called once at startup.
pub fn build_mode_table() -> [ModeDescriptor; ModeId::COUNT] {
    [
        // Index 0 — Manual
        ModeDescriptor {
            id: ModeId::Manual,
            name: "Manual",
            on_enter: Some(manual_enter),
            on_update: manual_update,
        },
        // Index 1 — Automatic
        ModeDescriptor {
            id: ModeId::Automatic,
            name: "Automatic",
            on_enter: Some(automatic_enter),
            on_update: automatic_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  MANUAL — direct speed control
// ═══════════════════════════════════════════════════════════════════════════

fn manual_enter(ctx: &mut CycleContext) {
    info!("MANUAL: speed {}%", ctx.speed_percent);
}

fn manual_update(ctx: &mut CycleContext) -> Option<ModeId> {
    if ctx.inputs.mode {
        return Some(ModeId::Automatic);
    }

    let step = ctx.config.speed_step;
    if ctx.inputs.increase {
        ctx.speed_percent = ctx.speed_percent.saturating_add(step).min(100);
    }
    if ctx.inputs.decrease {
        ctx.speed_percent = ctx.speed_percent.saturating_sub(step);
    }

    // The speed is commanded unconditionally every cycle so the drive
    // recovers from dropped writes without operator action.
    ctx.commands.speed = Some(ctx.speed_percent);

    let _ = write!(ctx.commands.line1, "SPEED {:>3}%", ctx.speed_percent);
    match ctx.sample {
        Some(pa) => {
            let _ = write!(ctx.commands.line2, "PRES {pa:>4} Pa");
        }
        None => {
            let _ = write!(ctx.commands.line2, "SENSOR FAULT");
        }
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  AUTOMATIC — closed-loop pressure regulation
// ═══════════════════════════════════════════════════════════════════════════

fn automatic_enter(ctx: &mut CycleContext) {
    // Defined reset semantics: stale integral windup or a half-filled
    // window from a previous stint must not leak into this one.
    ctx.pid.reset();
    ctx.filter.clear();
    ctx.last_sample_ms = None;
    info!("AUTOMATIC: regulating toward {} Pa", ctx.desired);
}

fn automatic_update(ctx: &mut CycleContext) -> Option<ModeId> {
    if ctx.inputs.mode {
        return Some(ModeId::Manual);
    }

    let step = ctx.config.desired_step;
    if ctx.inputs.increase {
        ctx.desired = ctx
            .desired
            .saturating_add(step)
            .min(ctx.config.desired_max);
    }
    if ctx.inputs.decrease {
        ctx.desired = ctx.desired.saturating_sub(step);
    }

    let _ = write!(ctx.commands.line1, "SET  {:>4} Pa", ctx.desired);

    // Sensor fault: skip actuation entirely and leave the filter,
    // controller and timestamp untouched — no phantom updates.
    let Some(raw) = ctx.sample else {
        let _ = write!(ctx.commands.line2, "SENSOR FAULT");
        return None;
    };

    let dt_ms = ctx.last_sample_ms.map(|prev| elapsed_ms(prev, ctx.now_ms));
    ctx.last_sample_ms = Some(ctx.now_ms);

    let ready = ctx.filter.push(raw);
    let filtered = if ready { ctx.filter.value() } else { None };

    match (filtered, dt_ms) {
        (Some(actual), Some(dt)) => {
            let speed = ctx
                .pid
                .step(f32::from(ctx.desired), f32::from(actual), dt);
            ctx.commands.speed = Some(speed);
            let _ = write!(ctx.commands.line2, "ACT  {actual:>4} Pa");
        }
        _ => {
            // Median window still warming up (or first usable sample):
            // show the raw reading, command nothing.
            let _ = write!(ctx.commands.line2, "WARMUP {raw:>4}");
        }
    }

    None
}
