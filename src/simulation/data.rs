use serde::{Deserialize, Serialize};

use crate::models::{Compartments, SCALP_EFFICACY_THRESHOLD};

/// Sampled output of one simulation run.
///
/// The three sample series have equal length `num_samples` and are evenly
/// spaced over `total_sim_time` hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationData {
    /// Serum drug concentration (ng/mL).
    pub serum_drug: Vec<f64>,
    /// Serum DHT suppression (%).
    pub serum_dht_suppression: Vec<f64>,
    /// Scalp DHT suppression (%).
    pub scalp_dht_suppression: Vec<f64>,
    /// Every dose given, in order.
    pub administrations: Vec<DoseAdministration>,
    pub num_samples: usize,
    /// Hours.
    pub total_sim_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoseAdministration {
    pub time: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub total_days: f64,
    pub dose_count: usize,
    pub total_dose_mg: f64,
    pub peak_serum_drug: f64,
    pub peak_serum_drug_day: f64,
    pub final_serum_dht_suppression: f64,
    pub final_scalp_dht_suppression: f64,
    /// First day scalp suppression reaches `SCALP_EFFICACY_THRESHOLD`.
    pub scalp_threshold_day: Option<f64>,
}

impl SimulationData {
    pub fn with_capacity(samples: usize) -> Self {
        Self {
            serum_drug: Vec::with_capacity(samples),
            serum_dht_suppression: Vec::with_capacity(samples),
            scalp_dht_suppression: Vec::with_capacity(samples),
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, state: &Compartments) {
        self.serum_drug.push(state.a_4);
        self.serum_dht_suppression.push(state.dht_suppression);
        self.scalp_dht_suppression.push(state.scalp_dht_suppression);
    }

    /// Sample times in days, `num_samples` points spread evenly over
    /// `[0, total_sim_time / 24]`.
    pub fn time_days(&self) -> Vec<f64> {
        let end = self.total_sim_time / 24.0;
        match self.num_samples {
            0 => Vec::new(),
            1 => vec![0.0],
            n => {
                let step = end / (n - 1) as f64;
                (0..n).map(|i| i as f64 * step).collect()
            }
        }
    }

    pub fn has_non_finite(&self) -> bool {
        self.serum_drug
            .iter()
            .chain(&self.serum_dht_suppression)
            .chain(&self.scalp_dht_suppression)
            .any(|value| !value.is_finite())
    }

    pub fn summary(&self) -> SimulationSummary {
        let days = self.time_days();

        let (peak_index, peak_serum_drug) = self
            .serum_drug
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0.0), |best, (i, value)| if value > best.1 { (i, value) } else { best });

        let scalp_threshold_day = self
            .scalp_dht_suppression
            .iter()
            .position(|&value| value >= SCALP_EFFICACY_THRESHOLD)
            .and_then(|i| days.get(i).copied());

        SimulationSummary {
            total_days: self.total_sim_time / 24.0,
            dose_count: self.administrations.len(),
            total_dose_mg: self.administrations.iter().map(|dose| dose.amount).sum(),
            peak_serum_drug,
            peak_serum_drug_day: days.get(peak_index).copied().unwrap_or(0.0),
            final_serum_dht_suppression: self.serum_dht_suppression.last().copied().unwrap_or(0.0),
            final_scalp_dht_suppression: self.scalp_dht_suppression.last().copied().unwrap_or(0.0),
            scalp_threshold_day,
        }
    }
}
