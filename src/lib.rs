//! Serum and scalp DHT suppression under arbitrary dutasteride dosing
//! schedules, from the Gisleskog et al. PK/PD model.

pub mod config;
pub mod dosing;
pub mod error;
pub mod models;
pub mod output;
pub mod simulation;

pub use crate::config::{Config, SimulationConfig};
pub use crate::dosing::Schedule;
pub use crate::error::{ScheduleSyntaxError, SimError, SimResult};
pub use crate::simulation::{SimulationData, Simulator};

/// Parse `schedule` and simulate it with macro step `dt` and sampling
/// interval `resolution`, both in hours.
pub fn simulate(schedule: &str, dt: f64, resolution: f64) -> SimResult<SimulationData> {
    let mut schedule = Schedule::parse(schedule)?;
    let simulator = Simulator::new(SimulationConfig {
        step_hours: dt,
        resolution_hours: resolution,
    })?;
    Ok(simulator.run(&mut schedule))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_is_repeatable() {
        let first = simulate("[1, 2d] x 10d", 0.01, 0.01).unwrap();
        let second = simulate("[1, 2d] x 10d", 0.01, 0.01).unwrap();
        assert_eq!(first.serum_drug, second.serum_drug);
        assert_eq!(first.serum_dht_suppression, second.serum_dht_suppression);
        assert_eq!(first.scalp_dht_suppression, second.scalp_dht_suppression);
        assert_eq!(first.administrations.len(), 5);
    }

    #[test]
    fn test_simulate_reports_syntax_errors() {
        assert!(matches!(
            simulate("[0.5, Zz] x 1d", 0.01, 0.01),
            Err(SimError::Schedule(ScheduleSyntaxError::InvalidWeekday(_)))
        ));
        assert!(matches!(
            simulate("", 0.01, 0.01),
            Err(SimError::Schedule(ScheduleSyntaxError::EmptyInput))
        ));
    }
}
