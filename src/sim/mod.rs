pub mod catalog;
pub mod driver;
pub mod job;
pub mod view;

pub use catalog::Catalog;
pub use driver::Sim;
pub use job::ProgramTemplate;
pub use view::{FinishedView, IoWaitView, QueuedView, RunningView, SystemView};
