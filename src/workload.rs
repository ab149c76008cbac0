use rand::prelude::*;

use crate::core::state::{MemUnits, Ticks};
use crate::sim::ProgramTemplate;

/// Parameters for a synthetic mix of short and long programs.
#[derive(Debug, Clone)]
pub struct Workload {
    pub programs: usize,
    pub p_short: f64,
    pub short_ticks: Ticks,
    pub long_ticks: Ticks,
    pub max_memory: MemUnits,
    // Probability a program blocks for I/O once
    pub p_io: f64,
    pub max_io_offset: Ticks,
    pub max_io_duration: Ticks,
    pub seed: u64,
}

impl Default for Workload {
    fn default() -> Self {
        Self {
            programs: 50,
            p_short: 0.3,
            short_ticks: 2,
            long_ticks: 6,
            max_memory: 8,
            p_io: 0.4,
            max_io_offset: 3,
            max_io_duration: 4,
            seed: 0,
        }
    }
}

impl Workload {
    /// Same seed, same programs. Names are `p0`, `p1`, ...
    pub fn generate(&self) -> Vec<ProgramTemplate> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut programs = Vec::with_capacity(self.programs);

        for i in 0..self.programs {
            let time = if rng.random::<f64>() < self.p_short {
                self.short_ticks
            } else {
                self.long_ticks
            };
            let memory = rng.random_range(1..=self.max_memory.max(1));

            let mut program = ProgramTemplate::new(format!("p{i}"), time.max(1), memory);
            if rng.random::<f64>() < self.p_io {
                let offset = rng.random_range(1..=self.max_io_offset.max(1));
                let duration = rng.random_range(1..=self.max_io_duration.max(1));
                program = program.with_io(offset, duration);
            }

            programs.push(program);
        }

        programs
    }
}
