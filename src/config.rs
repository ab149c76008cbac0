use serde::Deserialize;
use std::num::NonZeroU64;

use crate::core::state::MemUnits;
use crate::error::ConfigError;
use crate::sim::job::ProgramTemplate;

/// Initial simulator settings, optionally loaded from JSON.
///
/// ```json
/// { "total_memory": 100, "quantum": 4, "programs": [{ "name": "a", "time": 10, "memory": 5 }] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub total_memory: MemUnits,
    // Unset disables preemption
    pub quantum: Option<NonZeroU64>,
    pub programs: Vec<ProgramTemplate>,
}

impl SimConfig {
    pub fn new(total_memory: MemUnits, quantum: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            total_memory,
            quantum: Some(NonZeroU64::new(quantum).ok_or(ConfigError::ZeroQuantum)?),
            programs: Vec::new(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        for program in &config.programs {
            program.validate()?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quantum_is_rejected() {
        assert_eq!(SimConfig::new(10, 0), Err(ConfigError::ZeroQuantum));
    }

    #[test]
    fn parses_json_with_defaults() {
        let config = SimConfig::from_json(r#"{ "quantum": 3 }"#).expect("valid config");
        assert_eq!(config.total_memory, 0);
        assert_eq!(config.quantum, NonZeroU64::new(3));
        assert!(config.programs.is_empty());
    }

    #[test]
    fn json_zero_quantum_is_malformed() {
        assert!(matches!(
            SimConfig::from_json(r#"{ "quantum": 0 }"#),
            Err(ConfigError::Malformed(_))
        ));
    }

    #[test]
    fn json_zero_duration_io_is_rejected() {
        let json = r#"{ "programs": [
            { "name": "a", "time": 3, "memory": 1, "io": [{ "offset": 1, "duration": 0 }] }
        ] }"#;
        assert_eq!(
            SimConfig::from_json(json),
            Err(ConfigError::DegenerateIo {
                name: "a".into(),
                offset: 1,
                duration: 0
            })
        );
    }

    #[test]
    fn json_programs_are_validated() {
        let json = r#"{ "programs": [{ "name": "a", "time": 0, "memory": 1 }] }"#;
        assert_eq!(
            SimConfig::from_json(json),
            Err(ConfigError::ZeroRuntime("a".into()))
        );
    }
}
