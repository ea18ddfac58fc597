//! Deciding when training is over.
//!
//! Every strategy is polled once per completed generation with that
//! generation's statistics; training ends as soon as any of them says so.

use super::stats::GenerationStats;
use crate::types::ObjectiveSense;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub trait StopStrategy: Send {
    fn should_stop(&mut self, stats: &GenerationStats) -> bool;
}

/// Stops after a fixed number of generations
#[derive(Debug, Clone, Copy)]
pub struct EndIterations {
    max_iterations: usize,
}

impl EndIterations {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }
}

impl StopStrategy for EndIterations {
    fn should_stop(&mut self, stats: &GenerationStats) -> bool {
        stats.iteration >= self.max_iterations
    }
}

/// Stops once the best adjusted score has not improved for `max_without_improvement` generations
#[derive(Debug, Clone)]
pub struct NoImprovement {
    max_without_improvement: usize,
    sense: ObjectiveSense,
    best: f64,
    stale: usize,
}

impl NoImprovement {
    pub fn new(max_without_improvement: usize, sense: ObjectiveSense) -> Self {
        Self {
            max_without_improvement,
            sense,
            best: f64::NAN,
            stale: 0,
        }
    }

    pub fn generations_without_improvement(&self) -> usize {
        self.stale
    }
}

impl StopStrategy for NoImprovement {
    fn should_stop(&mut self, stats: &GenerationStats) -> bool {
        if self.sense.is_better(stats.best_adjusted_score, self.best) {
            self.best = stats.best_adjusted_score;
            self.stale = 0;
        } else {
            self.stale += 1;
        }
        self.stale >= self.max_without_improvement
    }
}

/// Stops once the best raw score reaches `target`
#[derive(Debug, Clone, Copy)]
pub struct TargetScore {
    target: f64,
    sense: ObjectiveSense,
}

impl TargetScore {
    pub fn new(target: f64, sense: ObjectiveSense) -> Self {
        Self { target, sense }
    }
}

impl StopStrategy for TargetScore {
    fn should_stop(&mut self, stats: &GenerationStats) -> bool {
        stats.best_score == self.target || self.sense.is_better(stats.best_score, self.target)
    }
}

/// Shareable cancellation flag.
///
/// Clones share the flag, so another thread can call [`StopSignal::stop`] while
/// a generation runs. The engine checks it after scoring and again at the end of
/// the generation; scoring already in flight always completes.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl StopStrategy for StopSignal {
    fn should_stop(&mut self, _stats: &GenerationStats) -> bool {
        self.is_stopped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(iteration: usize, best: f64) -> GenerationStats {
        GenerationStats {
            iteration,
            best_score: best,
            best_adjusted_score: best,
            ..Default::default()
        }
    }

    #[test]
    fn test_end_iterations() {
        let mut stop = EndIterations::new(3);
        assert!(!stop.should_stop(&stats(2, 0.0)));
        assert!(stop.should_stop(&stats(3, 0.0)));
    }

    #[test]
    fn test_no_improvement_counts_stale_generations() {
        let mut stop = NoImprovement::new(2, ObjectiveSense::Minimize);
        assert!(!stop.should_stop(&stats(1, 5.0)));
        assert!(!stop.should_stop(&stats(2, 4.0)));
        assert!(!stop.should_stop(&stats(3, 4.0)));
        assert!(stop.should_stop(&stats(4, 4.5)));
    }

    #[test]
    fn test_target_score_respects_sense() {
        let mut max = TargetScore::new(10.0, ObjectiveSense::Maximize);
        assert!(!max.should_stop(&stats(1, 9.0)));
        assert!(max.should_stop(&stats(2, 10.0)));

        let mut min = TargetScore::new(1.0, ObjectiveSense::Minimize);
        assert!(min.should_stop(&stats(1, 0.5)));
        assert!(!min.should_stop(&stats(1, f64::NAN)));
    }

    #[test]
    fn test_stop_signal_is_shared() {
        let signal = StopSignal::new();
        let mut polled = signal.clone();
        assert!(!polled.should_stop(&stats(1, 0.0)));
        signal.stop();
        assert!(polled.should_stop(&stats(1, 0.0)));
        signal.reset();
        assert!(!signal.is_stopped());
    }
}
