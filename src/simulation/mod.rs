pub mod data;

use log::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::dosing::Schedule;
use crate::error::SimResult;
use crate::models::{Compartments, ModelConstants, PkPdIntegrator};

pub use data::*;

/// Steps the model through a dosing schedule at a fixed macro step.
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run `schedule` from a drug-free steady state.
    ///
    /// The schedule's dose detector is reset first, so repeated runs of the
    /// same schedule give identical output.
    pub fn run(&self, schedule: &mut Schedule) -> SimulationData {
        let dt = self.config.step_hours;
        let resolution = self.config.resolution_hours;
        let total_run_time = schedule.total_run_time();

        let integrator = PkPdIntegrator::new(ModelConstants::new(dt));
        let mut state = Compartments::new(integrator.constants());
        schedule.reset();

        let steps = (total_run_time / dt).floor() as usize;
        let expected_samples = (total_run_time / resolution).ceil() as usize + 1;
        let mut data = SimulationData::with_capacity(expected_samples);
        info!(
            "Simulating {:.1} days in {} steps of {} h",
            total_run_time / 24.0,
            steps,
            dt
        );

        let mut time = 0.0;
        let mut since_sample = resolution;
        let mut stiff_steps = 0usize;
        for _ in 0..steps {
            let dose = schedule.dose_at(time);
            if dose != 0.0 {
                debug!("Administering {} mg at {:.2} h", dose, time);
                state.administer(dose);
                data.administrations.push(DoseAdministration { time, amount: dose });
            }
            if time > total_run_time {
                break;
            }

            while since_sample >= resolution {
                since_sample -= resolution;
                data.record(&state);
            }

            if integrator.step(&mut state) > 1 {
                stiff_steps += 1;
            }
            time += dt;
            since_sample += dt;
        }

        data.num_samples = data.serum_drug.len();
        data.total_sim_time = total_run_time;

        if stiff_steps > 0 {
            debug!("{} of {} steps were sub-stepped", stiff_steps, steps);
        }
        if data.has_non_finite() {
            warn!("Simulation produced non-finite values");
        }
        info!(
            "Simulation completed: {} samples, {} doses",
            data.num_samples,
            data.administrations.len()
        );
        data
    }
}
