use serde::{Deserialize, Serialize};

use crate::core::state::{IoRequest, MemUnits, Ticks};
use crate::error::ConfigError;

/// Static blueprint a job is instantiated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramTemplate {
    pub name: String,
    pub time: Ticks,
    pub memory: MemUnits,
    #[serde(default)]
    pub io: Vec<IoRequest>,
}

impl ProgramTemplate {
    pub fn new(name: impl Into<String>, time: Ticks, memory: MemUnits) -> Self {
        Self {
            name: name.into(),
            time,
            memory,
            io: Vec::new(),
        }
    }

    /// Appends an I/O request. Degenerate pairs (zero offset or duration)
    /// are dropped since they could never fire or never finish.
    pub fn with_io(mut self, offset: Ticks, duration: Ticks) -> Self {
        self.io.extend(IoRequest::new(offset, duration));
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time == 0 {
            return Err(ConfigError::ZeroRuntime(self.name.clone()));
        }
        // A zero offset never fires and stalls every later request; a zero
        // duration still costs the entry tick.
        if let Some(bad) = self.io.iter().find(|io| io.offset == 0 || io.duration == 0) {
            return Err(ConfigError::DegenerateIo {
                name: self.name.clone(),
                offset: bad.offset,
                duration: bad.duration,
            });
        }
        Ok(())
    }
}
