use serde::Serialize;
use std::fmt;

use crate::core::state::{MemUnits, SchedState, Ticks};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunningView {
    pub name: String,
    pub remaining: Ticks,
    pub memory: MemUnits,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueuedView {
    /// 1-based position in the ready queue
    pub position: usize,
    pub name: String,
    pub remaining: Ticks,
    pub memory: MemUnits,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinishedView {
    pub name: String,
    pub required: Ticks,
    pub admitted_at: Ticks,
    pub completed_at: Ticks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IoWaitView {
    pub name: String,
    pub remaining_io: Ticks,
}

/// Read-only projection of the simulator at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemView {
    pub now: Ticks,
    pub total_memory: MemUnits,
    pub available_memory: MemUnits,
    pub quantum: Option<Ticks>,
    pub running: Option<RunningView>,
    pub ready: Vec<QueuedView>,
    pub finished: Vec<FinishedView>,
    pub io_wait: Vec<IoWaitView>,
}

impl SystemView {
    pub fn capture(state: &SchedState) -> Self {
        let running = state.running.map(|running| {
            let job = state.job(running.job);
            RunningView {
                name: job.name.clone(),
                remaining: job.remaining_time,
                memory: job.memory,
            }
        });

        let ready = state
            .ready
            .iter()
            .enumerate()
            .map(|(index, &id)| {
                let job = state.job(id);
                QueuedView {
                    position: index + 1,
                    name: job.name.clone(),
                    remaining: job.remaining_time,
                    memory: job.memory,
                }
            })
            .collect();

        let finished = state
            .finished
            .iter()
            .map(|&id| {
                let job = state.job(id);
                FinishedView {
                    name: job.name.clone(),
                    required: job.required_time,
                    admitted_at: job.admitted_at,
                    completed_at: job.completion_time.unwrap_or(state.now),
                }
            })
            .collect();

        let io_wait = state
            .io_wait
            .iter()
            .map(|wait| IoWaitView {
                name: state.job(wait.job).name.clone(),
                remaining_io: wait.remaining,
            })
            .collect();

        Self {
            now: state.now,
            total_memory: state.total_memory,
            available_memory: state.available_memory,
            quantum: state.quantum.map(|q| q.get()),
            running,
            ready,
            finished,
            io_wait,
        }
    }

    pub fn finished_names(&self) -> Vec<&str> {
        self.finished.iter().map(|f| f.name.as_str()).collect()
    }
}

impl fmt::Display for SystemView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current time <{}>", self.now)?;

        match &self.running {
            Some(job) => writeln!(
                f,
                "Running job {} has {} time left and is using {} memory resources.",
                job.name, job.remaining, job.memory
            )?,
            None => writeln!(f, "Running job is empty")?,
        }

        if self.ready.is_empty() {
            writeln!(f, "The queue is: empty")?;
        } else {
            writeln!(f, "The queue is:")?;
            for job in &self.ready {
                writeln!(
                    f,
                    "  Position {}: job {} has {} units left and is using {} memory resources.",
                    job.position, job.name, job.remaining, job.memory
                )?;
            }
        }

        if !self.finished.is_empty() {
            writeln!(f, "Finished jobs are:")?;
            for job in &self.finished {
                writeln!(f, "  {} {} {}", job.name, job.required, job.completed_at)?;
            }
        }

        for job in &self.io_wait {
            writeln!(
                f,
                "The process {} is obtaining IO and will be back in {} units.",
                job.name, job.remaining_io
            )?;
        }

        Ok(())
    }
}
