use std::path::PathBuf;
use std::time::{Duration, Instant};

/// High-level behaviour requested by the caller.
///
/// The render policy decides whether frames animate in a window, stay pinned
/// to one timestamp, or are written to disk without opening a window.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPolicy {
    /// Animate continuously in a window, optionally capping the frame rate.
    Animate {
        /// Optional requested frames-per-second cap.
        target_fps: Option<f32>,
    },
    /// Show a single frame evaluated at `time` seconds.
    Still { time: f32 },
    /// Render one frame at `time` seconds and write it as a PNG.
    Export { path: PathBuf, time: f32 },
    /// Render an animation and write it as a GIF.
    Record {
        path: PathBuf,
        animation: AnimationSpec,
    },
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::Animate { target_fps: None }
    }
}

/// Length and frame rate of a recorded animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    pub duration: Duration,
    pub fps: f32,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(10),
            fps: 20.0,
        }
    }
}

impl AnimationSpec {
    /// Number of frames covering `duration`, never less than one.
    pub fn frame_count(&self) -> usize {
        let frames = (self.duration.as_secs_f64() * f64::from(self.fps)).round();
        if frames.is_finite() && frames >= 1.0 {
            frames as usize
        } else {
            1
        }
    }

    /// Display time of a single frame.
    pub fn frame_interval(&self) -> Duration {
        if self.fps > 0.0 && self.fps.is_finite() {
            Duration::from_secs_f64(1.0 / f64::from(self.fps))
        } else {
            Duration::ZERO
        }
    }
}

/// Snapshot of the time state handed to a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Elapsed wall-clock or simulated time in seconds.
    pub seconds: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

/// Abstraction over where time values originate from.
///
/// Every source yields non-decreasing `seconds` over its lifetime.
pub trait TimeSource: Send {
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            frame: 0,
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn sample(&mut self) -> TimeSample {
        let elapsed = self.origin.elapsed();
        let sample = TimeSample::new(elapsed.as_secs_f32(), self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source that always reports a fixed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    time: f32,
    frame: u64,
}

impl FixedTimeSource {
    pub fn new(time: f32) -> Self {
        Self { time, frame: 0 }
    }
}

impl TimeSource for FixedTimeSource {
    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.time, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source stepping through evenly spaced frames (`frame / fps`).
#[derive(Debug, Clone, Copy)]
pub struct SequenceTimeSource {
    fps: f32,
    frame: u64,
}

impl SequenceTimeSource {
    pub fn new(fps: f32) -> Self {
        Self { fps, frame: 0 }
    }
}

impl TimeSource for SequenceTimeSource {
    fn sample(&mut self) -> TimeSample {
        // Multiplying by the interval drifts; divide from the frame index instead.
        let seconds = if self.fps > 0.0 {
            (self.frame as f64 / f64::from(self.fps)) as f32
        } else {
            0.0
        };
        let sample = TimeSample::new(seconds, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Convenient alias for owning time sources behind trait objects.
pub type BoxedTimeSource = Box<dyn TimeSource + Send>;

/// Decides when the window loop should draw the next frame.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    single_shot: bool,
    last_frame: Option<Instant>,
}

impl FrameScheduler {
    /// Continuous animation, capped at `target_fps` when one is given.
    pub fn animate(target_fps: Option<f32>) -> Self {
        Self {
            interval: target_fps
                .filter(|fps| *fps > 0.0 && fps.is_finite())
                .map(|fps| Duration::from_secs_f32(1.0 / fps)),
            single_shot: false,
            last_frame: None,
        }
    }

    /// Draws once, then again only after [`reset`](Self::reset).
    pub fn single_shot() -> Self {
        Self {
            interval: None,
            single_shot: true,
            last_frame: None,
        }
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match (self.last_frame, self.single_shot, self.interval) {
            (None, _, _) => true,
            (Some(_), true, _) => false,
            (Some(_), false, None) => true,
            (Some(last), false, Some(interval)) => now.saturating_duration_since(last) >= interval,
        }
    }

    /// Earliest instant a capped animation wants another frame.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.single_shot {
            return None;
        }
        match (self.last_frame, self.interval) {
            (Some(last), Some(interval)) => Some(last + interval),
            _ => None,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }

    /// Forgets the last frame so the next check draws immediately.
    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}
