//! Fixed-step second-order Taylor integration of the dutasteride PK/PD model.
//!
//! Each macro step advances every state variable with
//! `y + y' * dt + y'' * dt^2 / 2`, where `y''` comes from differentiating the
//! model equations once more by hand. The DHT / isoenzyme subsystem is split
//! into sub-steps when it is locally stiff; the mass compartments always take
//! one full step.

use super::{Compartments, ModelConstants};

/// Isoenzyme rate to activity ratio at which the subsystem counts as stiff.
pub const STIFFNESS_RATIO: f64 = 100.0;
/// Sub-steps taken by the DHT / isoenzyme subsystem when stiff.
pub const STIFF_SUBSTEPS: usize = 10;

/// Time derivatives of the seven state variables.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rates {
    pub a_1: f64,
    pub a_2: f64,
    pub a_3: f64,
    pub a_4: f64,
    pub dht: f64,
    pub s5ar1: f64,
    pub s5ar2: f64,
}

#[derive(Debug, Clone)]
pub struct PkPdIntegrator {
    constants: ModelConstants,
}

impl PkPdIntegrator {
    pub fn new(constants: ModelConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &ModelConstants {
        &self.constants
    }

    /// Advance `state` by one macro step. Returns the number of sub-steps the
    /// DHT / isoenzyme subsystem used.
    pub fn step(&self, state: &mut Compartments) -> usize {
        let substeps = self.substeps_for(state);
        self.step_with(state, substeps);
        substeps
    }

    pub fn substeps_for(&self, state: &Compartments) -> usize {
        if self.is_stiff(state) {
            STIFF_SUBSTEPS
        } else {
            1
        }
    }

    pub fn is_stiff(&self, state: &Compartments) -> bool {
        let rates = self.first_derivatives(state);
        !(rates.s5ar1.abs() < state.s5ar1 * STIFFNESS_RATIO
            && rates.s5ar2.abs() < state.s5ar2 * STIFFNESS_RATIO)
    }

    /// One macro step with the DHT / isoenzyme subsystem split into
    /// `substeps` equal parts. During the sub-steps the drug level is held at
    /// its value from the start of the macro step.
    pub fn step_with(&self, state: &mut Compartments, substeps: usize) {
        let substeps = substeps.max(1);
        let n = substeps as f64;
        let dt = self.constants.dt / n;
        let dt2 = self.constants.dt2 / (n * n);

        let mut enzymes = *state;
        for _ in 0..substeps {
            enzymes = self.advance_isoenzymes(&enzymes, dt, dt2);
        }
        let mass = self.advance_mass_transfer(state, self.constants.dt, self.constants.dt2);

        state.a_1 = mass.a_1;
        state.a_2 = mass.a_2;
        state.a_3 = mass.a_3;
        state.a_4 = mass.a_4;
        state.dht = enzymes.dht;
        state.s5ar1 = enzymes.s5ar1;
        state.s5ar2 = enzymes.s5ar2;
        state.update_outputs(&self.constants);
    }

    /// Depot, central, peripheral and serum concentration after one Taylor
    /// step of length `dt`. Other fields are copied unchanged.
    pub fn advance_mass_transfer(&self, state: &Compartments, dt: f64, dt2: f64) -> Compartments {
        let d1 = self.first_derivatives(state);
        let d2 = self.second_derivatives(state, &d1);

        Compartments {
            a_1: state.a_1 + d1.a_1 * dt + d2.a_1 * dt2,
            a_2: state.a_2 + d1.a_2 * dt + d2.a_2 * dt2,
            a_3: state.a_3 + d1.a_3 * dt + d2.a_3 * dt2,
            a_4: state.a_4 + d1.a_4 * dt + d2.a_4 * dt2,
            ..*state
        }
    }

    /// DHT and both isoenzyme fractions after one Taylor step of length `dt`.
    /// Other fields are copied unchanged.
    pub fn advance_isoenzymes(&self, state: &Compartments, dt: f64, dt2: f64) -> Compartments {
        let d1 = self.first_derivatives(state);
        let d2 = self.second_derivatives(state, &d1);

        Compartments {
            dht: state.dht + d1.dht * dt + d2.dht * dt2,
            s5ar1: state.s5ar1 + d1.s5ar1 * dt + d2.s5ar1 * dt2,
            s5ar2: state.s5ar2 + d1.s5ar2 * dt + d2.s5ar2 * dt2,
            ..*state
        }
    }

    pub fn first_derivatives(&self, s: &Compartments) -> Rates {
        let c = &self.constants;
        let saturation = c.v_c * c.k_m + s.a_2;

        let a_2 = c.k_a * s.a_1 - (c.k_23 + c.k_20) * s.a_2 + c.k_32 * s.a_3
            - c.v_max * s.a_2 / saturation;

        Rates {
            a_1: -c.k_a * s.a_1,
            a_2,
            a_3: c.k_23 * s.a_2 - c.k_32 * s.a_3,
            a_4: a_2 / c.v_c,
            dht: self.dht_production(s.s5ar1, s.s5ar2) - c.k_out * s.dht,
            s5ar1: c.k_1 - c.k_1 * s.s5ar1 - c.ko_1 * s.a_4 * s.s5ar1,
            s5ar2: c.k_2 - c.k_2 * s.s5ar2 - c.ko_2 * s.a_4 * s.s5ar2,
        }
    }

    /// Second derivatives, given the first derivatives `d` at the same state.
    pub fn second_derivatives(&self, s: &Compartments, d: &Rates) -> Rates {
        let c = &self.constants;
        let saturation = c.v_c * c.k_m + s.a_2;

        // d/dt [a_2 / (V_c K_m + a_2)]
        let elimination = (saturation * d.a_2 - s.a_2 * d.a_2) / (saturation * saturation);
        let a_2 = c.k_a * d.a_1 - (c.k_23 + c.k_20) * d.a_2 + c.k_32 * d.a_3
            - c.v_max * elimination;

        Rates {
            a_1: -c.k_a * d.a_1,
            a_2,
            a_3: c.k_23 * d.a_2 - c.k_32 * d.a_3,
            a_4: a_2 / c.v_c,
            dht: self.dht_production(d.s5ar1, d.s5ar2) - c.k_out * d.dht,
            s5ar1: -c.k_1 * d.s5ar1 - c.ko_1 * (s.a_4 * d.s5ar1 + d.a_4 * s.s5ar1),
            s5ar2: -c.k_2 * d.s5ar2 - c.ko_2 * (s.a_4 * d.s5ar2 + d.a_4 * s.s5ar2),
        }
    }

    /// DHT synthesis, linear in both isoenzyme activities (or their rates).
    fn dht_production(&self, s5ar1: f64, s5ar2: f64) -> f64 {
        let c = &self.constants;
        c.k_out * c.dht_ss * c.far_2 * s5ar2 + c.k_out * c.dht_ss * (1.0 - c.far_2) * s5ar1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn integrator() -> PkPdIntegrator {
        PkPdIntegrator::new(ModelConstants::new(0.01))
    }

    #[test]
    fn test_steady_state_is_preserved() {
        let integrator = integrator();
        let mut state = Compartments::new(integrator.constants());

        for _ in 0..1000 {
            assert_eq!(integrator.step(&mut state), 1);
        }
        assert_relative_eq!(state.dht, 488.0, epsilon = 1e-9);
        assert_relative_eq!(state.s5ar1, 1.0, epsilon = 1e-12);
        assert_relative_eq!(state.s5ar2, 1.0, epsilon = 1e-12);
        assert_relative_eq!(state.a_2, 0.0);
        assert_relative_eq!(state.dht_suppression, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_depot_taylor_step() {
        let integrator = integrator();
        let mut state = Compartments::new(integrator.constants());
        state.administer(0.5);
        integrator.step(&mut state);

        let ka_dt = 2.41 * 0.01;
        let expected = 500.0 * (1.0 - ka_dt + 0.5 * ka_dt * ka_dt);
        assert_relative_eq!(state.a_1, expected, max_relative = 1e-12);
        assert_relative_eq!(state.a_1, 500.0 * (-ka_dt).exp(), max_relative = 1e-5);
        assert!(state.a_2 > 0.0);
        assert!(state.a_3 > 0.0);
        assert_relative_eq!(state.a_4, state.a_2 / 173.0, max_relative = 1e-9);
    }

    #[test]
    fn test_second_derivative_matches_finite_difference() {
        let integrator = integrator();
        let mut state = Compartments::new(integrator.constants());
        state.a_1 = 200.0;
        state.a_2 = 300.0;
        state.a_3 = 100.0;
        state.a_4 = 300.0 / 173.0;
        state.s5ar1 = 0.7;
        state.s5ar2 = 0.2;
        state.dht = 300.0;

        let h = 1e-6;
        let d1 = integrator.first_derivatives(&state);
        let d2 = integrator.second_derivatives(&state, &d1);

        let ahead = Compartments {
            a_1: state.a_1 + d1.a_1 * h,
            a_2: state.a_2 + d1.a_2 * h,
            a_3: state.a_3 + d1.a_3 * h,
            a_4: state.a_4 + d1.a_4 * h,
            dht: state.dht + d1.dht * h,
            s5ar1: state.s5ar1 + d1.s5ar1 * h,
            s5ar2: state.s5ar2 + d1.s5ar2 * h,
            ..state
        };
        let d1_ahead = integrator.first_derivatives(&ahead);

        assert_relative_eq!((d1_ahead.a_2 - d1.a_2) / h, d2.a_2, max_relative = 1e-4);
        assert_relative_eq!((d1_ahead.a_3 - d1.a_3) / h, d2.a_3, max_relative = 1e-4);
        assert_relative_eq!((d1_ahead.dht - d1.dht) / h, d2.dht, max_relative = 1e-4);
        assert_relative_eq!((d1_ahead.s5ar1 - d1.s5ar1) / h, d2.s5ar1, max_relative = 1e-4);
        assert_relative_eq!((d1_ahead.s5ar2 - d1.s5ar2) / h, d2.s5ar2, max_relative = 1e-4);
    }

    #[test]
    fn test_stiff_isoenzymes_are_substepped() {
        let integrator = integrator();
        let constants = integrator.constants().clone();
        let mut state = Compartments::new(&constants);
        state.a_1 = 1000.0;
        state.a_2 = 2.0e8;
        state.a_4 = 1.0e6;

        let rates = integrator.first_derivatives(&state);
        assert!(rates.s5ar1.abs() >= 100.0 * state.s5ar1);
        assert!(integrator.is_stiff(&state));
        assert_eq!(integrator.substeps_for(&state), STIFF_SUBSTEPS);

        let start = state;
        assert_eq!(integrator.step(&mut state), 10);

        let mass = integrator.advance_mass_transfer(&start, constants.dt, constants.dt2);
        assert_eq!(state.a_1, mass.a_1);
        assert_eq!(state.a_2, mass.a_2);
        assert_eq!(state.a_3, mass.a_3);
        assert_eq!(state.a_4, mass.a_4);

        let h = constants.dt / 10.0;
        let h2 = constants.dt2 / 100.0;
        let mut enzymes = start;
        for _ in 0..10 {
            enzymes = integrator.advance_isoenzymes(&enzymes, h, h2);
        }
        assert_eq!(state.dht, enzymes.dht);
        assert_eq!(state.s5ar1, enzymes.s5ar1);
        assert_eq!(state.s5ar2, enzymes.s5ar2);

        let single = integrator.advance_isoenzymes(&start, constants.dt, constants.dt2);
        assert_ne!(state.s5ar1, single.s5ar1);
    }

    #[test]
    fn test_single_substep_matches_full_taylor_step() {
        let integrator = integrator();
        let constants = integrator.constants().clone();
        let mut state = Compartments::new(&constants);
        state.administer(1.0);
        for _ in 0..500 {
            integrator.step(&mut state);
        }

        let start = state;
        let d1 = integrator.first_derivatives(&start);
        let d2 = integrator.second_derivatives(&start, &d1);
        integrator.step_with(&mut state, 1);

        assert_eq!(state.s5ar2, start.s5ar2 + d1.s5ar2 * constants.dt + d2.s5ar2 * constants.dt2);
        assert_eq!(state.a_3, start.a_3 + d1.a_3 * constants.dt + d2.a_3 * constants.dt2);
        assert_relative_eq!(
            state.dht_suppression,
            100.0 * (1.0 - state.dht / constants.dht_ss)
        );
    }
}
