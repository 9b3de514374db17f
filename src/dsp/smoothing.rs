//! Exponential moving average filter.

/*
Exponential Moving Average
==========================

The EMA is a one-pole lowpass over an irregular stream of measurements:

    value' = value * (1 - α) + sample * α

Vocabulary
----------

  α (alpha)   The smoothing coefficient, 0 < α <= 1. How much of each new
              sample leaks into the estimate. α = 1 means no filtering;
              α = 0.05 means each sample nudges the estimate 5% of the way
              toward it.

  fixed point A constant input stream leaves the estimate unchanged once it
              has converged there: ema(v, v) = v. This is what makes the
              filter safe to run forever - it cannot drift on its own.

  hold        The filter only moves when it is fed. Skipping updates (sensor
              dropout) freezes the estimate at its last value rather than
              decaying toward zero.

Step response: after k updates with a constant input v, the remaining error
is (1 - α)^k of the initial distance. At α = 0.05, roughly 45 updates halve
the error, and ~90 reach 1%.

The filter state is one f32. It is deliberately a plain struct passed by
ownership, not a module-level static, so each tracker instance can be tested
in isolation.
*/

/// One-pole exponential smoother.
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    alpha: f32,
    value: f32,
}

impl Ema {
    /// Create a smoother seeded at `initial` with coefficient `alpha`.
    pub fn new(alpha: f32, initial: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            value: initial,
        }
    }

    /// Fold one sample into the estimate and return the new value.
    pub fn update(&mut self, sample: f32) -> f32 {
        self.value = self.value * (1.0 - self.alpha) + sample * self.alpha;
        self.value
    }

    /// The current estimate. Unchanged since the last `update`.
    pub fn value(&self) -> f32 {
        self.value
    }
}
