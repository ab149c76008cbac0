use std::num::NonZeroU64;

use tracing::debug;

use super::{
    event::SimEvent,
    observer::Observer,
    state::{JobId, MemUnits, SchedState, Ticks},
};

/// The tick engine. Owns the scheduler state and advances it one time unit
/// per [`Engine::tick`].
#[derive(Debug)]
pub struct Engine {
    pub ctx: SchedState,
    observer: Observer,
}

impl Engine {
    pub fn new(total_memory: MemUnits, quantum: Option<NonZeroU64>) -> Self {
        Self {
            ctx: SchedState::new(total_memory, quantum),
            observer: Observer::new(),
        }
    }

    /// Advances the system by one tick and returns what happened.
    ///
    /// Rules, in order: dispatch into an empty running slot, execute one
    /// tick, fire the running job's I/O request if its quantum counter
    /// reached the request offset, progress every blocked job's I/O,
    /// finalize a finished job (dispatching the next one at once), and
    /// finally preempt a job whose slice ran out.
    ///
    /// A tick on a fully idle system does nothing, time included.
    pub fn tick(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if self.ctx.is_idle() {
            return events;
        }

        if self.ctx.running.is_none() {
            self.try_dispatch(&mut events);
        }

        self.ctx.advance_time(1);

        if let Some(job) = self.execute_running() {
            self.try_start_io(job, &mut events);
        }

        self.progress_io(&mut events);
        self.check_completion(&mut events);
        self.check_slice_expiry(&mut events);

        for event in &events {
            debug!(now = self.ctx.now, job = %self.ctx.job(event.job()).name, ?event, "tick");
        }

        self.observer.observe(&self.ctx);
        events
    }

    /// Ticks until nothing is running, ready or blocked. Returns the number
    /// of ticks that did work.
    pub fn run(&mut self) -> Ticks {
        let start = self.ctx.now;
        while !self.ctx.is_idle() {
            self.tick();
        }
        self.ctx.now - start
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    fn try_dispatch(&mut self, events: &mut Vec<SimEvent>) {
        if let Some(job) = self.ctx.pop_ready() {
            self.ctx.set_running(job);
            events.push(SimEvent::Dispatched { job });
        }
    }

    // Return the running job after charging it one tick of CPU
    fn execute_running(&mut self) -> Option<JobId> {
        let running = self.ctx.running.as_mut()?;
        running.elapsed += 1;
        let id = running.job;

        let job = self.ctx.job_mut(id);
        debug_assert!(job.remaining_time > 0, "job {id:?} dispatched with no work left");
        job.remaining_time = job.remaining_time.saturating_sub(1);
        Some(id)
    }

    fn try_start_io(&mut self, id: JobId, events: &mut Vec<SimEvent>) {
        let Some(running) = self.ctx.running else {
            return;
        };
        let Some(request) = self.ctx.job(id).pending_io() else {
            return;
        };
        if request.offset != running.elapsed {
            return;
        }

        // The slot stays empty until the next tick's dispatch.
        self.ctx.clear_running();
        self.ctx.job_mut(id).next_io += 1;
        self.ctx.block_on_io(id, request.duration);
        events.push(SimEvent::IoStarted {
            job: id,
            duration: request.duration,
        });
    }

    fn progress_io(&mut self, events: &mut Vec<SimEvent>) {
        let mut drained = Vec::new();
        self.ctx.io_wait.retain_mut(|wait| {
            wait.remaining = wait.remaining.saturating_sub(1);
            if wait.remaining == 0 {
                drained.push(wait.job);
                false
            } else {
                true
            }
        });

        for job in drained {
            events.push(SimEvent::IoCompleted { job });
            // Ran out of CPU work on the same tick it blocked.
            if self.ctx.job(job).remaining_time == 0 {
                self.finalize(job, events);
            } else {
                self.ctx.enqueue_ready(job);
            }
        }
    }

    fn check_completion(&mut self, events: &mut Vec<SimEvent>) {
        let Some(running) = self.ctx.running else {
            return;
        };
        if self.ctx.job(running.job).remaining_time > 0 {
            return;
        }

        self.ctx.clear_running();
        self.finalize(running.job, events);
        self.try_dispatch(events);
    }

    fn check_slice_expiry(&mut self, events: &mut Vec<SimEvent>) {
        let Some(running) = self.ctx.running else {
            return;
        };
        let Some(slice) = running.slice else {
            return;
        };
        if running.elapsed < slice.get() {
            return;
        }

        self.ctx.clear_running();
        self.ctx.enqueue_ready(running.job);
        events.push(SimEvent::Preempted { job: running.job });
    }

    fn finalize(&mut self, job: JobId, events: &mut Vec<SimEvent>) {
        self.ctx.finalize(job);
        events.push(SimEvent::Completed {
            job,
            at: self.ctx.now,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{IoRequest, JobState};

    fn engine(quantum: u64) -> Engine {
        Engine::new(1_000, NonZeroU64::new(quantum))
    }

    fn admit(engine: &mut Engine, name: &str, time: Ticks, io: Vec<IoRequest>) -> JobId {
        let id = engine.ctx.create_job(name, time, 10, io);
        engine.ctx.enqueue_ready(id);
        id
    }

    #[test]
    fn idle_tick_is_a_no_op() {
        let mut engine = engine(2);
        assert!(engine.tick().is_empty());
        assert_eq!(engine.now(), 0);
        assert_eq!(engine.observer().steps(), 0);
    }

    #[test]
    fn first_tick_dispatches_and_executes() {
        let mut engine = engine(4);
        let a = admit(&mut engine, "a", 3, Vec::new());

        let events = engine.tick();
        assert_eq!(events, vec![SimEvent::Dispatched { job: a }]);
        assert_eq!(engine.now(), 1);
        assert_eq!(engine.ctx.job(a).remaining_time, 2);
        assert_eq!(engine.ctx.running.map(|r| r.elapsed), Some(1));
    }

    #[test]
    fn completion_dispatches_next_job_in_same_tick() {
        let mut engine = engine(4);
        let a = admit(&mut engine, "a", 1, Vec::new());
        let b = admit(&mut engine, "b", 2, Vec::new());

        let events = engine.tick();
        assert_eq!(
            events,
            vec![
                SimEvent::Dispatched { job: a },
                SimEvent::Completed { job: a, at: 1 },
                SimEvent::Dispatched { job: b },
            ]
        );
        let running = engine.ctx.running.expect("b should be running");
        assert_eq!(running.job, b);
        assert_eq!(running.elapsed, 0);
    }

    #[test]
    fn slice_expiry_requeues_at_tail() {
        let mut engine = engine(2);
        let a = admit(&mut engine, "a", 5, Vec::new());
        let b = admit(&mut engine, "b", 5, Vec::new());

        engine.tick();
        let events = engine.tick();
        assert_eq!(events, vec![SimEvent::Preempted { job: a }]);
        assert!(engine.ctx.running.is_none());
        assert_eq!(engine.ctx.ready, [b, a]);
    }

    #[test]
    fn io_trigger_leaves_slot_empty_until_next_tick() {
        let mut engine = engine(4);
        let a = admit(&mut engine, "a", 5, IoRequest::new(1, 3).into_iter().collect());
        let b = admit(&mut engine, "b", 5, Vec::new());

        let events = engine.tick();
        assert_eq!(
            events,
            vec![
                SimEvent::Dispatched { job: a },
                SimEvent::IoStarted { job: a, duration: 3 },
            ]
        );
        assert!(engine.ctx.running.is_none());
        assert_eq!(engine.ctx.ready, [b]);
        // Decremented on the entry tick as well.
        assert_eq!(engine.ctx.io_wait[0].remaining, 2);
        assert_eq!(engine.ctx.job(a).state, JobState::Blocked);

        assert_eq!(engine.tick()[0], SimEvent::Dispatched { job: b });
    }

    #[test]
    fn io_fires_only_once() {
        let mut engine = engine(10);
        let a = admit(&mut engine, "a", 4, IoRequest::new(1, 1).into_iter().collect());

        let events = engine.tick();
        assert_eq!(
            events,
            vec![
                SimEvent::Dispatched { job: a },
                SimEvent::IoStarted { job: a, duration: 1 },
                SimEvent::IoCompleted { job: a },
            ]
        );
        assert_eq!(engine.ctx.ready, [a]);

        assert_eq!(engine.run(), 3);
        assert_eq!(engine.ctx.job(a).completion_time, Some(4));
    }

    #[test]
    fn io_requests_fire_in_order() {
        let mut engine = engine(10);
        let io = vec![
            IoRequest::new(2, 1).expect("valid"),
            IoRequest::new(1, 2).expect("valid"),
        ];
        let a = admit(&mut engine, "a", 6, io);

        engine.run();
        // Runs 2, blocks through its entry tick, runs 1, blocks one extra
        // tick, then runs the last 3.
        assert_eq!(engine.ctx.job(a).completion_time, Some(7));
        assert_eq!(engine.ctx.job(a).next_io, 2);
    }

    #[test]
    fn job_out_of_work_when_blocking_finishes_after_io() {
        let mut engine = engine(4);
        let a = admit(&mut engine, "a", 1, IoRequest::new(1, 2).into_iter().collect());

        engine.tick();
        assert_eq!(engine.ctx.job(a).remaining_time, 0);
        assert_eq!(engine.ctx.job(a).state, JobState::Blocked);

        let events = engine.tick();
        assert_eq!(
            events,
            vec![
                SimEvent::IoCompleted { job: a },
                SimEvent::Completed { job: a, at: 2 },
            ]
        );
        assert!(engine.ctx.is_idle());
        assert_eq!(engine.ctx.available_memory, 1_000);
    }

    #[test]
    fn quantum_change_applies_from_next_dispatch() {
        let mut engine = engine(3);
        let a = admit(&mut engine, "a", 10, Vec::new());

        engine.tick();
        engine.ctx.quantum = NonZeroU64::new(1);
        engine.tick();
        assert_eq!(engine.ctx.running.map(|r| r.job), Some(a));
        assert_eq!(engine.tick(), vec![SimEvent::Preempted { job: a }]);

        // Redispatched with the new slice.
        assert_eq!(
            engine.tick(),
            vec![SimEvent::Dispatched { job: a }, SimEvent::Preempted { job: a }]
        );
    }

    #[test]
    fn no_quantum_never_preempts() {
        let mut engine = Engine::new(100, None);
        let a = admit(&mut engine, "a", 7, Vec::new());
        admit(&mut engine, "b", 1, Vec::new());

        for _ in 0..6 {
            engine.tick();
            assert_eq!(engine.ctx.running.map(|r| r.job), Some(a));
        }
        engine.tick();
        assert_eq!(engine.ctx.finished, vec![a]);
    }
}
