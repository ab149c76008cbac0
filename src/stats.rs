use average::{Estimate, Mean};
use std::fmt;

use crate::core::state::Ticks;
use crate::sim::Sim;

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    pub jobs: usize,
    pub makespan: Ticks,
    // Admission to completion
    pub avg_turnaround: f64,
    // Turnaround minus CPU time, so blocked ticks count as waiting
    pub avg_waiting: f64,
}

impl RunStats {
    pub fn collect(sim: &Sim) -> Self {
        let turnaround = sim.finished_map(|job| {
            job.completion_time.unwrap_or(job.admitted_at) as f64 - job.admitted_at as f64
        });
        let waiting = sim.finished_map(|job| {
            let turnaround = job.completion_time.unwrap_or(job.admitted_at) - job.admitted_at;
            turnaround.saturating_sub(job.required_time) as f64
        });

        Self {
            jobs: sim.finished_map(|_| ()).count(),
            makespan: sim.now(),
            avg_turnaround: avg(turnaround),
            avg_waiting: avg(waiting),
        }
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Jobs finished: {}", self.jobs)?;
        writeln!(f, "Makespan: {} ticks", self.makespan)?;
        writeln!(f, "Average turnaround time: {:.2} ticks", self.avg_turnaround)?;
        writeln!(f, "Average waiting time: {:.2} ticks", self.avg_waiting)
    }
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<Mean>().estimate()
}
