pub mod driver;
pub mod event;
pub mod observer;
pub mod state;

pub use driver::Engine;
pub use event::SimEvent;
pub use state::{IoRequest, IoWait, Job, JobId, JobState, MemUnits, Running, SchedState, Ticks};
