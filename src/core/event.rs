use crate::core::{JobId, Ticks};

/// State changes produced by a single tick, in the order they happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    Dispatched { job: JobId },
    // Job left the CPU for the I/O-wait set
    IoStarted { job: JobId, duration: Ticks },
    IoCompleted { job: JobId },
    Completed { job: JobId, at: Ticks },
    // Slice expired; job went back to the ready queue tail
    Preempted { job: JobId },
}

impl SimEvent {
    pub fn job(&self) -> JobId {
        match *self {
            SimEvent::Dispatched { job }
            | SimEvent::IoStarted { job, .. }
            | SimEvent::IoCompleted { job }
            | SimEvent::Completed { job, .. }
            | SimEvent::Preempted { job } => job,
        }
    }
}
