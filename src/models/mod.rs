pub mod integrator;

pub use integrator::PkPdIntegrator;

/// Scalp DHT suppression (%) at which efficacy matches finasteride.
pub const SCALP_EFFICACY_THRESHOLD: f64 = 32.0;

/// Fixed parameters of the Gisleskog dutasteride PK/PD model plus the
/// integration step derived from `dt`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConstants {
    pub q: f64,        // Inter-compartmental clearance (L/h)
    pub v_p: f64,      // Peripheral volume (L)
    pub cl_l: f64,     // Linear clearance (L/h)
    pub v_c: f64,      // Central volume (L)
    pub k_a: f64,      // Absorption rate constant (1/h)
    pub k_23: f64,
    pub k_32: f64,
    pub k_20: f64,
    pub v_max: f64,    // Saturable elimination capacity
    pub k_m: f64,      // Michaelis-Menten constant
    pub v_ss: f64,

    pub dht_ss: f64,   // Steady-state serum DHT
    pub k_out: f64,    // DHT turnover (1/h)
    pub far_2: f64,    // Fraction of DHT produced by type 2 isoenzyme
    pub k_1: f64,      // Type 1 isoenzyme resynthesis
    pub k_2: f64,      // Type 2 isoenzyme resynthesis
    pub ko_1: f64,     // Type 1 inactivation by drug
    pub ko_2: f64,     // Type 2 inactivation by drug

    pub dt: f64,
    pub dt2: f64,      // dt^2 / 2
}

impl ModelConstants {
    pub fn new(dt: f64) -> Self {
        let q = 33.5;
        let v_p = 338.0;
        let cl_l = 0.583;
        let v_c = 173.0;

        Self {
            q,
            v_p,
            cl_l,
            v_c,
            k_a: 2.41,
            k_23: q / v_c,
            k_32: q / v_p,
            k_20: cl_l / v_c,
            v_max: 5.91,
            k_m: 0.957,
            v_ss: 511.0,

            dht_ss: 488.0,
            k_out: 0.393,
            far_2: 0.827,
            k_1: 0.0153,
            k_2: 0.00871,
            ko_1: 0.000594,
            ko_2: 0.0357,

            dt,
            dt2: 0.5 * dt * dt,
        }
    }
}

/// Model state: three mass compartments, serum concentration, DHT and the
/// two 5-alpha-reductase activity fractions.
///
/// Amounts are in micrograms. Nothing is clamped to physical bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compartments {
    pub a_1: f64,      // Dose depot (gut)
    pub a_2: f64,      // Central
    pub a_3: f64,      // Peripheral
    pub a_4: f64,      // Serum concentration (ng/mL)
    pub dht: f64,
    pub s5ar1: f64,
    pub s5ar2: f64,

    /// Serum DHT suppression (%), derived after every step.
    pub dht_suppression: f64,
    /// Scalp DHT suppression (%), derived after every step.
    pub scalp_dht_suppression: f64,
}

impl Compartments {
    /// Drug-free steady state.
    pub fn new(constants: &ModelConstants) -> Self {
        Self {
            a_1: 0.0,
            a_2: 0.0,
            a_3: 0.0,
            a_4: 0.0,
            dht: constants.dht_ss,
            s5ar1: 1.0,
            s5ar2: 1.0,
            dht_suppression: 0.0,
            scalp_dht_suppression: 0.0,
        }
    }

    /// Add an oral dose of `milligrams` to the depot.
    pub fn administer(&mut self, milligrams: f64) {
        self.a_1 += milligrams * 1000.0;
    }

    pub(crate) fn update_outputs(&mut self, constants: &ModelConstants) {
        self.dht_suppression = 100.0 * (1.0 - self.dht / constants.dht_ss);
        self.scalp_dht_suppression = 100.0 * (1.0 - scalp_dht_fraction(self.a_3));
    }
}

/// Fraction of scalp DHT remaining at peripheral level `c`.
///
/// Two saturable binding terms weighted by the type 1 / type 2 isoenzyme
/// share of scalp DHT production.
pub fn scalp_dht_fraction(c: f64) -> f64 {
    0.358 * (1.0 - c / (68.515 + c)) + 0.642 * (1.0 - c / (27397.306 + c))
}
