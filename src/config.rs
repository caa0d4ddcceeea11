use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Schedule to run instead of prompting for one.
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_step_hours")]
    pub step_hours: f64,        // Macro integration step (h)
    #[serde(default = "default_resolution_hours")]
    pub resolution_hours: f64,  // Sampling interval (h)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_write_report")]
    pub write_report: bool,
}

fn default_step_hours() -> f64 {
    0.01
}

fn default_resolution_hours() -> f64 {
    0.01
}

fn default_write_report() -> bool {
    true
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step_hours: default_step_hours(),
            resolution_hours: default_resolution_hours(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            write_report: default_write_report(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        self.simulation.validate()?;

        if let Some(schedule) = &self.schedule {
            if schedule.trim().is_empty() {
                return Err(SimError::Validation(
                    "Schedule must not be empty when given".to_string()
                ));
            }
        }

        Ok(())
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.step_hours.is_finite() && self.step_hours > 0.0) {
            return Err(SimError::Validation(
                format!("Step size must be positive, got {}", self.step_hours)
            ));
        }

        if !(self.resolution_hours.is_finite() && self.resolution_hours > 0.0) {
            return Err(SimError::Validation(
                format!("Sampling resolution must be positive, got {}", self.resolution_hours)
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.simulation, SimulationConfig::default());
        assert_eq!(config.simulation.step_hours, 0.01);
        assert_eq!(config.simulation.resolution_hours, 0.01);
        assert!(config.schedule.is_none());
        assert!(config.output.write_report);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config: Config = serde_json::from_str(
            r#"{"simulation": {"resolution_hours": 1.0}, "schedule": "[0.5, 1d] x 90d"}"#,
        )
        .unwrap();
        assert_eq!(config.simulation.step_hours, 0.01);
        assert_eq!(config.simulation.resolution_hours, 1.0);
        assert_eq!(config.schedule.as_deref(), Some("[0.5, 1d] x 90d"));
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.simulation.step_hours = -0.01;
        assert!(matches!(config.validate(), Err(SimError::Validation(_))));

        let mut config = Config::default();
        config.simulation.resolution_hours = f64::INFINITY;
        assert!(matches!(config.validate(), Err(SimError::Validation(_))));

        let mut config = Config::default();
        config.schedule = Some("   ".to_string());
        assert!(matches!(config.validate(), Err(SimError::Validation(_))));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("dutasteride_sim_config_{}.json", std::process::id()));
        std::fs::write(&path, r#"{"simulation": {"step_hours": 0.05}}"#).unwrap();
        let config = Config::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.simulation.step_hours, 0.05);

        assert!(matches!(
            Config::from_file("/nonexistent/dutasteride_sim.json"),
            Err(SimError::Io(_))
        ));
    }
}
