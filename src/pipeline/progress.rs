//! Periodic progress reporting for the dispatch loop.
//!
//! Bulk files hold several thousand records and the total is unknown until the
//! stream ends, so progress is reported every `report_interval` records rather
//! than as a percentage.

/// Callback invoked with the current progress.
pub type ProgressReportFn = fn(&ProgressState);

/// Progress of one run's dispatch loop.
#[derive(Debug, Clone)]
pub struct ProgressState {
    /// Source being processed, as shown in status lines
    pub state_id: String,
    /// Records dispatched so far
    pub current: u64,
    /// Value of `current` at the last report
    pub last: u64,
    /// Records between reports; zero disables reporting
    pub report_interval: u64,
    pub reporter: Option<ProgressReportFn>,
}

impl ProgressState {
    pub fn new(state_id: &str, report_interval: u64, reporter: Option<ProgressReportFn>) -> Self {
        Self {
            state_id: state_id.to_string(),
            current: 0,
            last: 0,
            report_interval,
            reporter,
        }
    }

    /// Records that `current` items are done and calls the reporter when due.
    ///
    /// Returns `true` when the reporter was called.
    pub fn report(&mut self, current: u64) -> bool {
        self.current = current;
        if self.report_interval == 0 || current < self.last + self.report_interval {
            return false;
        }
        self.last = current;
        match self.reporter {
            Some(reporter) => {
                reporter(self);
                true
            }
            None => false,
        }
    }
}

/// Reporter writing progress to the `info` log.
pub fn log_progress(state: &ProgressState) {
    log::info!("{}: {} records dispatched", state.state_id, state.current);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_interval() {
        let mut progress = ProgressState::new("ipg140107", 100, Some(log_progress));
        let reported: Vec<u64> = (1..=350).filter(|i| progress.report(*i)).collect();
        assert_eq!(reported, [100, 200, 300]);
        assert_eq!(progress.current, 350);

        let mut silent = ProgressState::new("ipg140107", 0, Some(log_progress));
        assert!(!(1..=10).any(|i| silent.report(i)));
        let mut no_reporter = ProgressState::new("ipg140107", 1, None);
        assert!(!no_reporter.report(5));
    }
}
