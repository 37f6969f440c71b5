//! Timer engine - progress and completion of the current item

use std::time::Duration;
use tokio::time::Instant;

use super::clock::PlaybackClock;

/// Lifecycle of one activation's timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    /// Not started, or stopped
    Idle,
    /// Counting towards completion (possibly paused)
    Running,
    /// Completion already fired for this activation
    Completed,
}

/// One progress reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerSample {
    /// Fraction of the duration elapsed, in `0.0..=1.0`
    pub progress: f64,
    /// Set on the single sample that completes the activation
    pub completed: bool,
}

impl TimerSample {
    /// Progress as a percentage for progress bars
    #[inline]
    pub fn percent(&self) -> f64 {
        self.progress * 100.0
    }
}

/// Tracks how far through its duration the current item is
///
/// The engine is passive: the controller feeds it the current instant on
/// every sampling tick and acts on the returned sample.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    clock: Option<PlaybackClock>,
    duration_ms: i64,
    phase: TimerPhase,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerEngine {
    pub fn new() -> Self {
        Self {
            clock: None,
            duration_ms: 0,
            phase: TimerPhase::Idle,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_some_and(|clock| clock.is_paused())
    }

    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    /// Reset the clock and start counting from zero
    ///
    /// A zero or negative duration completes immediately; the returned sample
    /// is then the activation's one completion.
    pub fn start(&mut self, duration_ms: i64, now: Instant) -> TimerSample {
        self.clock = Some(PlaybackClock::start(now));
        self.duration_ms = duration_ms;

        if duration_ms <= 0 {
            self.phase = TimerPhase::Completed;
            return TimerSample {
                progress: 1.0,
                completed: true,
            };
        }

        self.phase = TimerPhase::Running;
        TimerSample {
            progress: 0.0,
            completed: false,
        }
    }

    /// Freeze elapsed time. Returns false if there was nothing to pause.
    pub fn pause(&mut self, now: Instant) -> bool {
        match (&mut self.clock, self.phase) {
            (Some(clock), TimerPhase::Running) => clock.pause(now),
            _ => false,
        }
    }

    /// Continue counting from where `pause` left off
    pub fn resume(&mut self, now: Instant) -> bool {
        match (&mut self.clock, self.phase) {
            (Some(clock), TimerPhase::Running) => clock.resume(now),
            _ => false,
        }
    }

    /// Drop the clock; nothing is sampled until the next `start`
    pub fn stop(&mut self) {
        self.clock = None;
        self.phase = TimerPhase::Idle;
    }

    /// Replace the target duration without resetting elapsed time
    ///
    /// Returns the completing sample if the new duration has already been
    /// reached.
    pub fn set_duration(&mut self, duration_ms: i64, now: Instant) -> Option<TimerSample> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        self.duration_ms = duration_ms;
        let sample = self.sample(now)?;
        sample.completed.then_some(sample)
    }

    /// Time elapsed in the current activation
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.clock.map_or(Duration::ZERO, |clock| clock.elapsed(now))
    }

    /// Current progress without side effects
    pub fn progress(&self, now: Instant) -> f64 {
        match self.phase {
            TimerPhase::Completed => 1.0,
            TimerPhase::Idle => 0.0,
            TimerPhase::Running => {
                if self.duration_ms <= 0 {
                    return 1.0;
                }
                let elapsed_ns = self.elapsed(now).as_nanos() as f64;
                (elapsed_ns / (self.duration_ms as f64 * 1_000_000.0)).min(1.0)
            }
        }
    }

    /// Take a sample; `None` once completed or when idle
    ///
    /// The first sample to reach 1.0 carries `completed = true` and moves the
    /// engine to `Completed`, so completion fires once per `start`.
    pub fn sample(&mut self, now: Instant) -> Option<TimerSample> {
        if self.phase != TimerPhase::Running {
            return None;
        }

        let progress = self.progress(now);
        let completed = progress >= 1.0;
        if completed {
            self.phase = TimerPhase::Completed;
        }

        Some(TimerSample {
            progress,
            completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_progress_is_monotonic_and_completes_once() {
        let t0 = Instant::now();
        let mut timer = TimerEngine::new();
        timer.start(1_000, t0);

        let mut last = 0.0;
        let mut completions = 0;
        for step in 1..=40u64 {
            if let Some(sample) = timer.sample(t0 + ms(step * 50)) {
                assert!(sample.progress >= last);
                last = sample.progress;
                if sample.completed {
                    completions += 1;
                }
            }
        }

        assert_eq!(completions, 1);
        assert_eq!(timer.phase(), TimerPhase::Completed);
        assert!(timer.sample(t0 + ms(5_000)).is_none());
    }

    #[test]
    fn test_half_way() {
        let t0 = Instant::now();
        let mut timer = TimerEngine::new();
        timer.start(2_000, t0);

        let sample = timer.sample(t0 + ms(1_000)).unwrap();
        assert!((sample.progress - 0.5).abs() < 1e-9);
        assert!((sample.percent() - 50.0).abs() < 1e-6);
        assert!(!sample.completed);
    }

    #[test]
    fn test_pause_keeps_progress() {
        let t0 = Instant::now();
        let mut timer = TimerEngine::new();
        timer.start(1_000, t0);

        assert!(timer.pause(t0 + ms(300)));
        assert!(timer.is_paused());
        assert_eq!(timer.elapsed(t0 + ms(9_000)), ms(300));

        assert!(timer.resume(t0 + ms(9_000)));
        assert_eq!(timer.elapsed(t0 + ms(9_000)), ms(300));
        let sample = timer.sample(t0 + ms(9_000)).unwrap();
        assert!((sample.progress - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_zero_duration_completes_on_start() {
        let mut timer = TimerEngine::new();
        let sample = timer.start(0, Instant::now());
        assert!(sample.completed);
        assert_eq!(timer.phase(), TimerPhase::Completed);
        assert!(timer.sample(Instant::now()).is_none());

        let sample = timer.start(-5, Instant::now());
        assert!(sample.completed);
    }

    #[test]
    fn test_restart_allows_new_completion() {
        let t0 = Instant::now();
        let mut timer = TimerEngine::new();
        timer.start(100, t0);
        assert!(timer.sample(t0 + ms(100)).unwrap().completed);

        timer.start(100, t0 + ms(200));
        assert!(!timer.sample(t0 + ms(250)).unwrap().completed);
        assert!(timer.sample(t0 + ms(300)).unwrap().completed);
    }

    #[test]
    fn test_set_duration_keeps_elapsed() {
        let t0 = Instant::now();
        let mut timer = TimerEngine::new();
        timer.start(15_000, t0);

        assert!(timer.set_duration(4_000, t0 + ms(1_000)).is_none());
        let sample = timer.sample(t0 + ms(2_000)).unwrap();
        assert!((sample.progress - 0.5).abs() < 1e-9);

        let done = timer.set_duration(1_500, t0 + ms(2_000)).unwrap();
        assert!(done.completed);
        assert_eq!(timer.phase(), TimerPhase::Completed);
    }

    #[test]
    fn test_stop_goes_idle() {
        let mut timer = TimerEngine::new();
        timer.start(1_000, Instant::now());
        timer.stop();
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert!(timer.sample(Instant::now()).is_none());
        assert!(!timer.pause(Instant::now()));
        assert!(timer.progress(Instant::now()).abs() < f64::EPSILON);
    }
}
