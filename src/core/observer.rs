use rustc_hash::FxHashSet;

use super::state::{JobState, SchedState, Ticks};

/// Checks the engine's invariants after every tick. All checks are
/// `debug_assert!`s, so release builds only pay for the step counter.
#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
    last_now: Ticks,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, state: &SchedState) {
        self.step += 1;

        debug_assert!(
            state.now >= self.last_now,
            "time went backwards: {} -> {}",
            self.last_now,
            state.now
        );
        self.last_now = state.now;

        debug_assert_eq!(
            state.available_memory + state.reserved_memory(),
            state.total_memory,
            "available + reserved memory must equal total memory"
        );

        if cfg!(debug_assertions) {
            Self::check_ownership(state);
        }
    }

    fn check_ownership(state: &SchedState) {
        let mut seen = FxHashSet::default();

        if let Some(running) = state.running {
            let job = state.job(running.job);
            debug_assert_eq!(
                job.state,
                JobState::Running,
                "running slot holds job {:?} in state {:?}",
                job.id,
                job.state
            );
            debug_assert!(
                running.slice.is_none_or(|slice| running.elapsed < slice.get()),
                "job {:?} outlived its slice",
                job.id
            );
            seen.insert(running.job);
        }

        let queued = state
            .ready
            .iter()
            .map(|&id| (id, JobState::Ready))
            .chain(state.io_wait.iter().map(|w| (w.job, JobState::Blocked)))
            .chain(state.finished.iter().map(|&id| (id, JobState::Finished)));

        for (id, expected) in queued {
            let job = state.job(id);
            debug_assert_eq!(
                job.state, expected,
                "job {id:?} is queued as {expected:?} but marked {:?}",
                job.state
            );
            debug_assert!(seen.insert(id), "job {id:?} owned by two places at once");
        }

        debug_assert_eq!(
            seen.len(),
            state.jobs.len(),
            "every admitted job must be owned by exactly one place"
        );
    }
}
