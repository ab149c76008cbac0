use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use std::collections::VecDeque;
use std::num::NonZeroU64;

pub type Ticks = u64;
pub type MemUnits = u64;

new_key_type! {
    pub struct JobId;
}

/// One blocking I/O operation. Fires when the job's elapsed-quantum counter
/// reaches `offset`, then keeps the job off the CPU for `duration` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoRequest {
    pub offset: Ticks,
    pub duration: Ticks,
}

impl IoRequest {
    /// `None` when the pair can never fire or never drain.
    pub fn new(offset: Ticks, duration: Ticks) -> Option<Self> {
        (offset > 0 && duration > 0).then_some(Self { offset, duration })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Ready,
    Running,
    Blocked,
    Finished,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    pub state: JobState,
    pub required_time: Ticks,
    pub remaining_time: Ticks,
    pub memory: MemUnits,
    pub io: Vec<IoRequest>,
    // Index of the next I/O request that has not fired yet
    pub next_io: usize,
    pub admitted_at: Ticks,
    pub completion_time: Option<Ticks>,
}

impl Job {
    pub fn pending_io(&self) -> Option<IoRequest> {
        self.io.get(self.next_io).copied()
    }

    pub fn is_live(&self) -> bool {
        self.state != JobState::Finished
    }
}

/// The occupant of the running slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Running {
    pub job: JobId,
    // Quantum in force when the job was dispatched; `None` never preempts
    pub slice: Option<NonZeroU64>,
    pub elapsed: Ticks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoWait {
    pub job: JobId,
    pub remaining: Ticks,
}

#[derive(Debug)]
pub struct SchedState {
    pub now: Ticks,
    pub total_memory: MemUnits,
    pub available_memory: MemUnits,
    pub quantum: Option<NonZeroU64>,
    pub jobs: SlotMap<JobId, Job>,
    pub ready: VecDeque<JobId>,
    // Kept in the order jobs blocked
    pub io_wait: Vec<IoWait>,
    pub running: Option<Running>,
    pub finished: Vec<JobId>,
}

impl SchedState {
    pub fn new(total_memory: MemUnits, quantum: Option<NonZeroU64>) -> Self {
        Self {
            now: 0,
            total_memory,
            available_memory: total_memory,
            quantum,
            jobs: SlotMap::with_key(),
            ready: VecDeque::new(),
            io_wait: Vec::new(),
            running: None,
            finished: Vec::new(),
        }
    }

    /// Reserves `memory` and creates a job that is not yet in any queue.
    /// The caller has already checked that the memory is available.
    pub fn create_job(
        &mut self,
        name: &str,
        required_time: Ticks,
        memory: MemUnits,
        io: Vec<IoRequest>,
    ) -> JobId {
        debug_assert!(
            memory <= self.available_memory,
            "Reserving {memory} units with only {} available",
            self.available_memory
        );
        self.available_memory -= memory;

        let admitted_at = self.now;
        self.jobs.insert_with_key(|id| Job {
            id,
            name: name.to_owned(),
            state: JobState::Ready,
            required_time,
            remaining_time: required_time,
            memory,
            io,
            next_io: 0,
            admitted_at,
            completion_time: None,
        })
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    pub fn job(&self, id: JobId) -> &Job {
        &self.jobs[id]
    }

    pub fn job_mut(&mut self, id: JobId) -> &mut Job {
        &mut self.jobs[id]
    }

    pub fn enqueue_ready(&mut self, id: JobId) {
        debug_assert!(
            !self.ready.contains(&id),
            "Job {id:?} already present in the ready queue"
        );
        let job = self.job_mut(id);
        debug_assert!(job.is_live(), "Finished job {id:?} cannot be requeued");
        job.state = JobState::Ready;
        self.ready.push_back(id);
    }

    pub fn pop_ready(&mut self) -> Option<JobId> {
        self.ready.pop_front()
    }

    pub fn set_running(&mut self, id: JobId) {
        debug_assert!(self.running.is_none(), "Running slot already occupied");
        self.job_mut(id).state = JobState::Running;
        self.running = Some(Running {
            job: id,
            slice: self.quantum,
            elapsed: 0,
        });
    }

    pub fn clear_running(&mut self) -> Option<Running> {
        self.running.take()
    }

    pub fn block_on_io(&mut self, id: JobId, duration: Ticks) {
        self.job_mut(id).state = JobState::Blocked;
        self.io_wait.push(IoWait {
            job: id,
            remaining: duration,
        });
    }

    /// Records completion, releases the reservation and appends to the
    /// finished list. The job must already be out of every queue.
    pub fn finalize(&mut self, id: JobId) {
        let now = self.now;
        let job = self.job_mut(id);
        debug_assert!(job.is_live(), "Job {id:?} finalized twice");

        job.state = JobState::Finished;
        job.remaining_time = 0;
        job.completion_time = Some(now);
        let memory = job.memory;

        self.available_memory += memory;
        self.finished.push(id);
    }

    pub fn reserved_memory(&self) -> MemUnits {
        self.jobs
            .values()
            .filter(|job| job.is_live())
            .map(|job| job.memory)
            .sum()
    }

    /// True when nothing is running, ready or blocked.
    pub fn is_idle(&self) -> bool {
        self.running.is_none() && self.ready.is_empty() && self.io_wait.is_empty()
    }
}
