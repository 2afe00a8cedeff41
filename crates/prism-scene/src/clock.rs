use std::time::Duration;

pub const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(100);
pub const RATE_WINDOW: Duration = Duration::from_millis(500);

/// Frame timing snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Clamped seconds since the previous tick; zero on the first tick.
    pub dt: f32,
    /// Host timestamp passed to the tick.
    pub now: Duration,
    pub frame_index: u64,
}

/// Frames-per-second sampled over a fixed accumulation window.
#[derive(Debug, Clone)]
pub struct RateMeter {
    window: Duration,
    frames: u32,
    accumulated: Duration,
    rate: Option<f32>,
}

impl RateMeter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            frames: 0,
            accumulated: Duration::ZERO,
            rate: None,
        }
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.frames += 1;
        self.accumulated += elapsed;
        if self.accumulated >= self.window {
            self.rate = Some(self.frames as f32 / self.accumulated.as_secs_f32());
            self.frames = 0;
            self.accumulated = Duration::ZERO;
        }
    }

    /// `None` until the first window has filled.
    pub fn rate(&self) -> Option<f32> {
        self.rate
    }
}

/// Turns host timestamps into clamped frame deltas.
///
/// The rate meter sees raw wall time so that long stalls show up in the
/// readout even though the simulation step is capped.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Duration>,
    max_delta: Duration,
    frame_index: u64,
    meter: RateMeter,
}

impl FrameClock {
    pub fn new(max_delta: Duration) -> Self {
        Self {
            last: None,
            max_delta,
            frame_index: 0,
            meter: RateMeter::new(RATE_WINDOW),
        }
    }

    pub fn max_delta(&self) -> Duration {
        self.max_delta
    }

    pub fn advance(&mut self, now: Duration) -> FrameTime {
        let elapsed = match self.last {
            Some(last) => {
                let elapsed = now.saturating_sub(last);
                self.meter.record(elapsed);
                elapsed
            }
            None => Duration::ZERO,
        };
        self.last = Some(now);

        let ft = FrameTime {
            dt: elapsed.min(self.max_delta).as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }

    pub fn frame_rate(&self) -> Option<f32> {
        self.meter.rate()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_DELTA)
    }
}
