//! Simulation time for Sonance
//!
//! Tracks the current simulation time that sound delays are measured against,
//! and provides a fixed-rate cadence used to throttle periodic work.

use serde::{Deserialize, Serialize};

/// Configuration for the simulation clock
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// How many simulated seconds pass per real second
    pub time_scale: f32,
    /// Maximum delta time to prevent spiral of death
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            max_delta_time: 0.25,
        }
    }
}

/// Simulation time tracking
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    /// Configuration
    pub config: TimeConfig,
    /// Simulation time since start in seconds
    pub current_time: f64,
    /// Delta time for this frame (clamped and scaled)
    pub delta_time: f32,
    /// Frame counter
    pub frame_count: u64,
    /// Whether the simulation is paused
    pub paused: bool,
}

impl SimClock {
    /// Create a new clock with custom config
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Advance the clock by the raw delta from the previous frame
    pub fn update(&mut self, raw_delta: f32) {
        self.frame_count += 1;

        if self.paused {
            self.delta_time = 0.0;
            return;
        }

        self.delta_time = raw_delta.min(self.config.max_delta_time) * self.config.time_scale;
        self.current_time += self.delta_time as f64;
    }

    /// Pause the simulation
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume the simulation
    pub fn resume(&mut self) {
        self.paused = false;
    }
}

/// Fires at most once per period as time is fed into it.
///
/// The first call to [`Cadence::tick`] always fires so work is not delayed a
/// full period at startup.
#[derive(Debug, Clone)]
pub struct Cadence {
    period: f32,
    elapsed: f32,
    primed: bool,
}

impl Cadence {
    /// Create a cadence firing `hz` times per second. Non-positive rates fire every tick.
    pub fn from_hz(hz: f32) -> Self {
        let period = if hz > 0.0 { 1.0 / hz } else { 0.0 };
        Self {
            period,
            elapsed: 0.0,
            primed: false,
        }
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    /// Feed `delta` seconds; returns true when the period has elapsed.
    pub fn tick(&mut self, delta: f32) -> bool {
        if !self.primed {
            self.primed = true;
            self.elapsed = 0.0;
            return true;
        }

        self.elapsed += delta;
        if self.elapsed >= self.period {
            // Drop the remainder instead of catching up on missed periods.
            self.elapsed = 0.0;
            return true;
        }
        false
    }

    /// Make the next tick fire regardless of elapsed time
    pub fn reset(&mut self) {
        self.primed = false;
        self.elapsed = 0.0;
    }
}
