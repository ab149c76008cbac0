use thiserror::Error;

/// Reasons a program could not be turned into a job.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("program {0} not found")]
    ProgramNotFound(String),

    #[error("not enough memory to start program {name}: needs {required}, {available} available")]
    InsufficientMemory {
        name: String,
        required: u64,
        available: u64,
    },
}

/// Rejected configuration or template values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("burst quantum must be positive")]
    ZeroQuantum,

    #[error("total memory {total} is below the {reserved} units reserved by live jobs")]
    MemoryBelowReserved { total: u64, reserved: u64 },

    #[error("program {0} must require at least one tick of CPU time")]
    ZeroRuntime(String),

    #[error("program {name}: I/O offset {offset} and duration {duration} must both be positive")]
    DegenerateIo {
        name: String,
        offset: u64,
        duration: u64,
    },

    #[error("invalid config: {0}")]
    Malformed(String),
}

/// Errors from the text command language.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command {0}")]
    UnknownCommand(String),

    #[error("{command} expects {expected}")]
    BadArguments {
        command: &'static str,
        expected: &'static str,
    },

    #[error("{0} is not a non-negative integer")]
    NotANumber(String),
}

/// Anything the front end may report back to the user.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Admission(#[from] AdmissionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
