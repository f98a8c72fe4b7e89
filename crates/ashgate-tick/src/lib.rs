//! Fixed-timestep simulation clock for Ashgate.
//!
//! The session actor advances every state machine on a periodic
//! simulation tick with a fixed `dt`. The clock sits inside the actor's
//! `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = commands.recv() => { /* handle commands */ }
//!         tick = clock.wait_for_tick() => {
//!             session.tick(tick.dt);
//!         }
//!     }
//! }
//! ```
//!
//! While paused the tick future pends, so nothing advances — regen,
//! countdowns and wave pacing all freeze with the clock. Overruns use a
//! skip policy: missed ticks are dropped and the cadence restarts from
//! now, preventing catch-up death spirals.

use std::time::Duration;

use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, warn};

/// Settings for the simulation clock.
#[derive(Debug, Clone, Copy)]
pub struct ClockConfig {
    /// Tick rate in Hz. Clamped to `1..=MAX_TICK_RATE_HZ`.
    pub tick_rate_hz: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { tick_rate_hz: 30 }
    }
}

impl ClockConfig {
    /// Highest supported tick rate.
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// Clamps out-of-range values so the config is safe to use.
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz == 0 {
            warn!("tick rate of 0 clamped to 1");
            self.tick_rate_hz = 1;
        }
        if self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            warn!(
                rate = self.tick_rate_hz,
                max = Self::MAX_TICK_RATE_HZ,
                "tick rate exceeds maximum, clamping"
            );
            self.tick_rate_hz = Self::MAX_TICK_RATE_HZ;
        }
        self
    }

    /// Duration of one tick.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64)
    }
}

/// One completed tick.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Monotonically increasing tick number, starting at 1.
    pub n: u64,
    /// Fixed delta time — always `1 / tick_rate`, never wall-clock
    /// elapsed time, so simulation stays deterministic.
    pub dt: Duration,
    /// Ticks dropped because this one fired late.
    pub skipped: u64,
}

/// The fixed-step clock driving one session.
#[derive(Debug)]
pub struct SimClock {
    dt: Duration,
    next: TokioInstant,
    count: u64,
    paused: bool,
    skipped_total: u64,
}

impl SimClock {
    pub fn new(config: ClockConfig) -> Self {
        let config = config.validated();
        let dt = config.tick_duration();
        debug!(rate_hz = config.tick_rate_hz, dt_ms = dt.as_secs_f64() * 1000.0, "clock created");
        Self {
            dt,
            next: TokioInstant::now() + dt,
            count: 0,
            paused: false,
            skipped_total: 0,
        }
    }

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(ClockConfig { tick_rate_hz })
    }

    /// Waits until the next tick is due. Pends forever while paused —
    /// `select!` keeps serving the other branches.
    pub async fn wait_for_tick(&mut self) -> Tick {
        if self.paused {
            std::future::pending::<()>().await;
            unreachable!()
        }

        time::sleep_until(self.next).await;
        let now = TokioInstant::now();
        self.count += 1;

        // Skip policy: when we wake up late, drop the missed ticks and
        // restart the cadence from now.
        let late_by = now.saturating_duration_since(self.next);
        let mut skipped = 0u64;
        if late_by > self.dt / 10 {
            skipped = (late_by.as_nanos() / self.dt.as_nanos()) as u64;
            if skipped > 0 {
                warn!(
                    tick = self.count,
                    skipped,
                    late_ms = late_by.as_secs_f64() * 1000.0,
                    "tick overrun, skipping ahead"
                );
                self.skipped_total += skipped;
            }
            self.next = now + self.dt;
        } else {
            self.next += self.dt;
        }

        Tick { n: self.count, dt: self.dt, skipped }
    }

    /// Freezes the clock. Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.count, "clock paused");
        }
    }

    /// Resumes after a pause, rescheduling from now so the pause does not
    /// produce a burst of overrun ticks.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.next = TokioInstant::now() + self.dt;
            debug!(tick = self.count, "clock resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn tick_count(&self) -> u64 {
        self.count
    }

    /// The fixed per-tick delta.
    pub fn dt(&self) -> Duration {
        self.dt
    }

    pub fn skipped_total(&self) -> u64 {
        self.skipped_total
    }
}
