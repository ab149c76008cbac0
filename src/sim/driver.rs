use std::num::NonZeroU64;

use tracing::{info, warn};

use super::{catalog::Catalog, job::ProgramTemplate, view::SystemView};
use crate::{
    config::SimConfig,
    core::{
        driver::Engine,
        event::SimEvent,
        state::{Job, JobId, MemUnits, Ticks},
    },
    error::{AdmissionError, ConfigError},
};

/// The simulator: a program catalog in front of the tick engine.
#[derive(Debug)]
pub struct Sim {
    pub core: Engine,
    catalog: Catalog,
}

impl Default for Sim {
    fn default() -> Self {
        Self::new()
    }
}

impl Sim {
    /// No memory and no quantum; configure before admitting anything.
    pub fn new() -> Self {
        Self {
            core: Engine::new(0, None),
            catalog: Catalog::new(),
        }
    }

    pub fn with_config(config: SimConfig) -> Result<Self, ConfigError> {
        let mut sim = Self {
            core: Engine::new(config.total_memory, config.quantum),
            catalog: Catalog::new(),
        };
        for program in config.programs {
            sim.register_template(program)?;
        }
        Ok(sim)
    }

    /// Sets total memory. Available memory becomes the new total minus
    /// whatever live jobs still hold.
    pub fn set_memory(&mut self, total: MemUnits) -> Result<(), ConfigError> {
        let ctx = &mut self.core.ctx;
        let reserved = ctx.reserved_memory();
        if total < reserved {
            return Err(ConfigError::MemoryBelowReserved { total, reserved });
        }

        ctx.total_memory = total;
        ctx.available_memory = total - reserved;
        info!(total, available = ctx.available_memory, "memory configured");
        Ok(())
    }

    /// Currently available memory.
    pub fn memory(&self) -> MemUnits {
        self.core.ctx.available_memory
    }

    /// Sets the round-robin quantum. A job already on the CPU keeps the
    /// slice it was dispatched with.
    pub fn set_burst(&mut self, quantum: Ticks) -> Result<(), ConfigError> {
        let quantum = NonZeroU64::new(quantum).ok_or(ConfigError::ZeroQuantum)?;
        self.core.ctx.quantum = Some(quantum);
        info!(quantum = quantum.get(), "burst quantum configured");
        Ok(())
    }

    pub fn burst(&self) -> Option<Ticks> {
        self.core.ctx.quantum.map(NonZeroU64::get)
    }

    pub fn register_template(&mut self, template: ProgramTemplate) -> Result<(), ConfigError> {
        self.catalog.register(template)
    }

    /// Registers a program with at most one I/O request. An `io_offset` or
    /// `io_duration` of zero means the program does no I/O.
    pub fn add_program(
        &mut self,
        name: &str,
        time: Ticks,
        memory: MemUnits,
        io_offset: Ticks,
        io_duration: Ticks,
    ) -> Result<(), ConfigError> {
        self.register_template(
            ProgramTemplate::new(name, time, memory).with_io(io_offset, io_duration),
        )
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Instantiates the first template called `name` and appends the job to
    /// the ready queue. Nothing changes on failure.
    pub fn admit(&mut self, name: &str) -> Result<JobId, AdmissionError> {
        let template = self
            .catalog
            .get(name)
            .ok_or_else(|| AdmissionError::ProgramNotFound(name.to_owned()))?;

        let ctx = &mut self.core.ctx;
        if template.memory > ctx.available_memory {
            warn!(
                name,
                required = template.memory,
                available = ctx.available_memory,
                "admission rejected"
            );
            return Err(AdmissionError::InsufficientMemory {
                name: name.to_owned(),
                required: template.memory,
                available: ctx.available_memory,
            });
        }

        let id = ctx.create_job(
            &template.name,
            template.time,
            template.memory,
            template.io.clone(),
        );
        ctx.enqueue_ready(id);
        info!(
            name,
            memory = template.memory,
            available = ctx.available_memory,
            "job admitted"
        );
        Ok(id)
    }

    pub fn tick(&mut self) -> Vec<SimEvent> {
        self.core.tick()
    }

    /// Ticks until every admitted job has finished.
    pub fn run(&mut self) -> Ticks {
        self.core.run()
    }

    pub fn snapshot(&self) -> SystemView {
        SystemView::capture(&self.core.ctx)
    }

    pub fn now(&self) -> Ticks {
        self.core.now()
    }

    pub fn is_idle(&self) -> bool {
        self.core.ctx.is_idle()
    }

    /// Maps every finished job, in finish order.
    pub fn finished_map<'a, T: 'a>(
        &'a self,
        f: impl Fn(&Job) -> T + 'a,
    ) -> impl Iterator<Item = T> + 'a {
        let ctx = &self.core.ctx;
        ctx.finished.iter().map(move |&id| f(ctx.job(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::IoRequest;

    fn sim(memory: MemUnits, quantum: Ticks) -> Sim {
        let mut sim = Sim::new();
        sim.set_memory(memory).expect("memory");
        sim.set_burst(quantum).expect("quantum");
        sim
    }

    #[test]
    fn unknown_program_is_reported() {
        let mut sim = sim(10, 2);
        assert_eq!(
            sim.admit("ghost"),
            Err(AdmissionError::ProgramNotFound("ghost".into()))
        );
        assert!(sim.is_idle());
    }

    #[test]
    fn insufficient_memory_leaves_state_unchanged() {
        let mut sim = sim(10, 2);
        sim.add_program("big", 5, 20, 0, 0).expect("valid");

        assert_eq!(
            sim.admit("big"),
            Err(AdmissionError::InsufficientMemory {
                name: "big".into(),
                required: 20,
                available: 10,
            })
        );
        assert_eq!(sim.memory(), 10);
        assert!(sim.snapshot().ready.is_empty());
    }

    #[test]
    fn admission_reserves_until_completion() {
        let mut sim = sim(10, 2);
        sim.add_program("a", 3, 6, 0, 0).expect("valid");
        sim.admit("a").expect("fits");
        assert_eq!(sim.memory(), 4);
        assert!(sim.admit("a").is_err());

        sim.run();
        assert_eq!(sim.memory(), 10);
        sim.admit("a").expect("memory was released");
    }

    #[test]
    fn admission_does_not_touch_running_slot() {
        let mut sim = sim(10, 5);
        sim.add_program("a", 3, 1, 0, 0).expect("valid");
        sim.admit("a").expect("fits");
        assert!(sim.snapshot().running.is_none());
        assert_eq!(sim.snapshot().ready.len(), 1);
    }

    #[test]
    fn set_memory_respects_live_reservations() {
        let mut sim = sim(10, 2);
        sim.add_program("a", 3, 6, 0, 0).expect("valid");
        sim.admit("a").expect("fits");

        assert_eq!(
            sim.set_memory(5),
            Err(ConfigError::MemoryBelowReserved {
                total: 5,
                reserved: 6
            })
        );
        sim.set_memory(20).expect("enough");
        assert_eq!(sim.memory(), 14);
    }

    #[test]
    fn register_template_rejects_zero_offset_io() {
        let mut sim = sim(10, 2);
        let mut template = ProgramTemplate::new("p", 4, 1);
        template.io = vec![
            IoRequest {
                offset: 0,
                duration: 3,
            },
            IoRequest {
                offset: 1,
                duration: 2,
            },
        ];

        assert!(matches!(
            sim.register_template(template),
            Err(ConfigError::DegenerateIo { offset: 0, .. })
        ));
        assert!(sim.catalog().is_empty());
        assert_eq!(
            sim.admit("p"),
            Err(AdmissionError::ProgramNotFound("p".into()))
        );
    }

    #[test]
    fn zero_burst_is_rejected() {
        let mut sim = Sim::new();
        assert_eq!(sim.set_burst(0), Err(ConfigError::ZeroQuantum));
        assert_eq!(sim.burst(), None);
    }

    #[test]
    fn with_config_registers_programs() {
        let config = SimConfig::from_json(
            r#"{
                "total_memory": 50,
                "quantum": 2,
                "programs": [{ "name": "a", "time": 4, "memory": 5 }]
            }"#,
        )
        .expect("valid config");
        let mut sim = Sim::with_config(config).expect("valid programs");

        sim.admit("a").expect("registered");
        assert_eq!(sim.memory(), 45);
        assert_eq!(sim.burst(), Some(2));
    }
}
