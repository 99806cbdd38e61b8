use crate::config::{Mode, RunConfig};

/// Outcome of comparing one epoch's criterion against the best so far.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decision {
    /// Beat the tolerance-adjusted best. `previous` is the best before this epoch.
    Improved { criterion: f64, previous: f64 },
    /// Did not beat `threshold`; `epochs_without_improvement` includes this epoch.
    NotImproved {
        criterion: f64,
        threshold: f64,
        epochs_without_improvement: usize,
    },
}

impl Decision {
    #[inline]
    pub fn improved(&self) -> bool {
        matches!(self, Decision::Improved { .. })
    }
}

/// Best-score bookkeeping for early stopping.
///
/// Assessing an epoch does not mutate anything; the caller commits the
/// decision once its side effects (saving a checkpoint) have succeeded.
#[derive(Clone, Debug)]
pub struct ImprovementTracker {
    mode: Mode,
    tolerance: f64,
    patience: usize,
    best_score: f64,
    best_epoch: Option<usize>,
    epochs_without_improvement: usize,
}

impl ImprovementTracker {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            mode: config.mode,
            tolerance: config.tolerance,
            patience: config.patience,
            best_score: config.mode.worst(),
            best_epoch: None,
            epochs_without_improvement: 0,
        }
    }

    pub fn assess(&self, criterion: f64) -> Decision {
        let threshold = self.mode.threshold(self.best_score, self.tolerance);
        if self.mode.beats(criterion, threshold) {
            Decision::Improved {
                criterion,
                previous: self.best_score,
            }
        } else {
            Decision::NotImproved {
                criterion,
                threshold,
                epochs_without_improvement: self.epochs_without_improvement + 1,
            }
        }
    }

    pub fn commit(&mut self, epoch: usize, decision: &Decision) {
        match *decision {
            Decision::Improved { criterion, .. } => {
                self.best_score = criterion;
                self.best_epoch = Some(epoch);
                self.epochs_without_improvement = 0;
            }
            Decision::NotImproved {
                epochs_without_improvement,
                ..
            } => {
                self.epochs_without_improvement = epochs_without_improvement;
            }
        }
    }

    pub fn should_stop(&self) -> bool {
        self.epochs_without_improvement > self.patience
    }

    #[inline]
    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    #[inline]
    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }

    #[inline]
    pub fn epochs_without_improvement(&self) -> usize {
        self.epochs_without_improvement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(patience: usize, tolerance: f64, mode: Mode) -> ImprovementTracker {
        ImprovementTracker::new(&RunConfig::new(10, patience, tolerance, mode))
    }

    #[test]
    fn test_first_finite_criterion_improves() {
        let t = tracker(0, 0.5, Mode::Maximize);
        assert!(t.assess(0.0).improved());

        let t = tracker(0, 0.5, Mode::Minimize);
        assert!(t.assess(1e9).improved());
    }

    #[test]
    fn test_assess_does_not_mutate() {
        let t = tracker(2, 0.0, Mode::Minimize);
        let _ = t.assess(0.5);
        let _ = t.assess(0.9);
        assert_eq!(t.best_score(), f64::INFINITY);
        assert_eq!(t.epochs_without_improvement(), 0);
        assert_eq!(t.best_epoch(), None);
    }

    #[test]
    fn test_commit_tracks_counter_and_best() {
        let mut t = tracker(1, 0.01, Mode::Maximize);

        let d = t.assess(0.5);
        t.commit(0, &d);
        assert_eq!(t.best_score(), 0.5);
        assert_eq!(t.best_epoch(), Some(0));

        let d = t.assess(0.505);
        assert_eq!(
            d,
            Decision::NotImproved {
                criterion: 0.505,
                threshold: 0.51,
                epochs_without_improvement: 1
            }
        );
        t.commit(1, &d);
        assert!(!t.should_stop());

        let d = t.assess(0.4);
        t.commit(2, &d);
        assert_eq!(t.epochs_without_improvement(), 2);
        assert!(t.should_stop());
        assert_eq!(t.best_score(), 0.5);
        assert_eq!(t.best_epoch(), Some(0));
    }

    #[test]
    fn test_improvement_resets_counter() {
        let mut t = tracker(3, 0.0, Mode::Minimize);
        for (epoch, loss) in [1.0, 1.2, 1.1, 0.9].into_iter().enumerate() {
            let d = t.assess(loss);
            t.commit(epoch, &d);
        }
        assert_eq!(t.epochs_without_improvement(), 0);
        assert_eq!(t.best_epoch(), Some(3));
        assert_eq!(t.best_score(), 0.9);
    }
}
