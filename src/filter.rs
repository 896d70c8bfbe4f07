//! First-order IIR building blocks for the derived-word calculators.
//!
//! Both filters run at fixed rates from the scheduler, so the coefficients
//! bake the sample period in. A filter is only trusted after its spool
//! window: eleven consecutive valid samples, restarted from scratch by any
//! invalid one.

use crate::config::{DifferentiatorConfig, LowPassConfig};

/// `y[n] = k1*y[n-1] + k2*x[n]`.
#[derive(Debug, Clone, Copy)]
pub struct LowPass {
    k1: f64,
    k2: f64,
    prev_output: f64,
    preloaded: bool,
}

impl LowPass {
    pub fn new(cfg: &LowPassConfig) -> Self {
        LowPass {
            k1: cfg.k1,
            k2: cfg.k2,
            prev_output: 0.0,
            preloaded: false,
        }
    }

    pub fn reset(&mut self) {
        self.prev_output = 0.0;
        self.preloaded = false;
    }

    /// Seeds the history with the current sample so the output does not
    /// slew up from zero.
    pub fn preload(&mut self, x: f64) {
        self.prev_output = x;
        self.preloaded = true;
    }

    pub fn run(&mut self, x: f64) -> f64 {
        let y = self.k1 * self.prev_output + self.k2 * x;
        self.prev_output = y;
        y
    }

    pub fn output(&self) -> f64 {
        self.prev_output
    }

    pub fn is_preloaded(&self) -> bool {
        self.preloaded
    }
}

/// Rate-limited differentiator.
///
/// The raw derivative is the input step scaled by the sample rate, lightly
/// smoothed by `k1`. A step outside the delta window is not a rate at all
/// but a wrap (heading passing through +-180 degrees), so the previous
/// output is held instead. The final output is clamped to the rate limits.
#[derive(Debug, Clone, Copy)]
pub struct Differentiator {
    k1: f64,
    sample_rate_hz: f64,
    upper_limit: f64,
    lower_limit: f64,
    upper_delta: f64,
    lower_delta: f64,
    prev_input: f64,
    prev_output: f64,
}

impl Differentiator {
    pub fn new(cfg: &DifferentiatorConfig) -> Self {
        Differentiator {
            k1: cfg.k1,
            sample_rate_hz: cfg.sample_rate_hz,
            upper_limit: cfg.upper_limit,
            lower_limit: cfg.lower_limit,
            upper_delta: cfg.upper_delta,
            lower_delta: cfg.lower_delta,
            prev_input: 0.0,
            prev_output: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.prev_input = 0.0;
        self.prev_output = 0.0;
    }

    /// Seeds the input history; the derivative of a freshly preloaded
    /// signal is zero.
    pub fn preload(&mut self, x: f64) {
        self.prev_input = x;
        self.prev_output = 0.0;
    }

    pub fn run(&mut self, x: f64) -> f64 {
        let delta = x - self.prev_input;
        self.prev_input = x;

        let y = if delta > self.upper_delta || delta < self.lower_delta {
            self.prev_output
        } else {
            let raw = delta * self.sample_rate_hz;
            let smoothed = self.k1 * raw + (1.0 - self.k1) * self.prev_output;
            smoothed.clamp(self.lower_limit, self.upper_limit)
        };
        self.prev_output = y;
        y
    }

    pub fn output(&self) -> f64 {
        self.prev_output
    }
}

/// Valid samples required beyond the preload before a filter is trusted.
pub const SPOOL_THRESHOLD: usize = 10;

/// Where a filter stands in its warm-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpoolPhase {
    /// First valid sample: seed the filter and output zero.
    Preload,
    /// Running but not yet trusted.
    Spooling,
    /// Trusted output.
    Good,
}

/// Warm-up tracker shared by the turn-rate and slip-angle calculators.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spool {
    good: bool,
    count: usize,
}

impl Spool {
    pub fn new() -> Self {
        Spool::default()
    }

    /// Records an invalid input; the warm-up starts over.
    pub fn invalid(&mut self) {
        self.good = false;
        self.count = 0;
    }

    /// Records a valid input and reports the resulting phase.
    pub fn valid(&mut self) -> SpoolPhase {
        if self.good {
            return SpoolPhase::Good;
        }
        if self.count == 0 {
            self.count = 1;
            return SpoolPhase::Preload;
        }
        self.count += 1;
        if self.count > SPOOL_THRESHOLD {
            self.good = true;
            SpoolPhase::Good
        } else {
            SpoolPhase::Spooling
        }
    }

    pub fn is_good(&self) -> bool {
        self.good
    }
}
