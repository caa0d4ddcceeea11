use crate::config::SimulationConfig;
use crate::error::SimResult;
use crate::models::SCALP_EFFICACY_THRESHOLD;
use crate::simulation::{SimulationData, SimulationSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use log::info;

/// What gets written to `summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub schedule: String,
    pub normalized_schedule: String,
    pub generated_at: DateTime<Utc>,
    pub step_hours: f64,
    pub resolution_hours: f64,
    pub summary: SimulationSummary,
}

impl RunReport {
    pub fn new(
        schedule: &str,
        normalized_schedule: String,
        config: &SimulationConfig,
        data: &SimulationData,
    ) -> Self {
        Self {
            schedule: schedule.trim().to_string(),
            normalized_schedule,
            generated_at: Utc::now(),
            step_hours: config.step_hours,
            resolution_hours: config.resolution_hours,
            summary: data.summary(),
        }
    }
}

pub fn save_results<P: AsRef<Path>>(
    data: &SimulationData,
    report: &RunReport,
    output_dir: P,
    write_report: bool,
) -> SimResult<()> {
    let output_path = output_dir.as_ref();
    std::fs::create_dir_all(output_path)?;

    save_samples(data, output_path.join("samples.csv"))?;
    save_doses(data, output_path.join("doses.csv"))?;
    save_summary(report, output_path.join("summary.json"))?;
    if write_report {
        generate_report(report, output_path)?;
    }

    info!("All results saved to {:?}", output_path);
    Ok(())
}

fn save_samples<P: AsRef<Path>>(data: &SimulationData, path: P) -> SimResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record([
        "TIME_DAYS",
        "SERUM_DRUG_NG_ML",
        "SERUM_DHT_SUPPRESSION_PCT",
        "SCALP_DHT_SUPPRESSION_PCT",
    ])?;

    let days = data.time_days();
    for (i, day) in days.iter().enumerate() {
        writer.write_record(&[
            day.to_string(),
            data.serum_drug[i].to_string(),
            data.serum_dht_suppression[i].to_string(),
            data.scalp_dht_suppression[i].to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn save_doses<P: AsRef<Path>>(data: &SimulationData, path: P) -> SimResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(["TIME_HOURS", "DOSE_MG"])?;
    for dose in &data.administrations {
        writer.write_record(&[dose.time.to_string(), dose.amount.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

fn save_summary<P: AsRef<Path>>(report: &RunReport, path: P) -> SimResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

/// Short plain-text description of a run, as printed by the CLI.
pub fn format_summary(summary: &SimulationSummary) -> String {
    let threshold = match summary.scalp_threshold_day {
        Some(day) => format!("day {:.1}", day),
        None => "not reached".to_string(),
    };

    format!(
        "Simulated {:.1} days, {} doses ({:.2} mg total)\n\
         Peak serum drug: {:.3} ng/mL on day {:.1}\n\
         Final serum DHT suppression: {:.1}%\n\
         Final scalp DHT suppression: {:.1}%\n\
         Scalp suppression >= {}%: {}",
        summary.total_days,
        summary.dose_count,
        summary.total_dose_mg,
        summary.peak_serum_drug,
        summary.peak_serum_drug_day,
        summary.final_serum_dht_suppression,
        summary.final_scalp_dht_suppression,
        SCALP_EFFICACY_THRESHOLD,
        threshold,
    )
}

pub fn generate_report<P: AsRef<Path>>(report: &RunReport, output_dir: P) -> SimResult<()> {
    let report_path = output_dir.as_ref().join("simulation_report.md");

    let report_content = format!(
        r#"# Dutasteride PK/PD Simulation Report

Generated {}

## Dosing Schedule
- **Input**: `{}`
- **Normalized**: `{}`

## Settings
- **Integration step**: {} h
- **Sampling resolution**: {} h

## Results
```text
{}
```

## Files Generated
- `samples.csv`: Serum drug level and DHT suppression over time
- `doses.csv`: Every administered dose
- `summary.json`: Run parameters and summary statistics
"#,
        report.generated_at.to_rfc3339(),
        report.schedule,
        report.normalized_schedule,
        report.step_hours,
        report.resolution_hours,
        format_summary(&report.summary),
    );

    std::fs::write(report_path, report_content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::DoseAdministration;

    fn sample_data() -> SimulationData {
        SimulationData {
            serum_drug: vec![0.0, 2.0, 1.0],
            serum_dht_suppression: vec![0.0, 40.0, 60.0],
            scalp_dht_suppression: vec![0.0, 20.0, 35.0],
            administrations: vec![DoseAdministration { time: 0.0, amount: 0.5 }],
            num_samples: 3,
            total_sim_time: 48.0,
        }
    }

    #[test]
    fn test_format_summary() {
        let text = format_summary(&sample_data().summary());
        assert!(text.contains("Simulated 2.0 days, 1 doses"));
        assert!(text.contains("Final scalp DHT suppression: 35.0%"));
        assert!(text.contains(">= 32%: day 2.0"));
    }

    #[test]
    fn test_save_results() {
        let dir = std::env::temp_dir().join(format!("dutasteride_sim_output_{}", std::process::id()));
        let data = sample_data();
        let report = RunReport::new(
            " [0.5, 1d] x 2d ",
            "[0.5 mg/24 h] x 48 h".to_string(),
            &SimulationConfig::default(),
            &data,
        );

        save_results(&data, &report, &dir, true).unwrap();

        let samples = std::fs::read_to_string(dir.join("samples.csv")).unwrap();
        let lines: Vec<&str> = samples.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "TIME_DAYS,SERUM_DRUG_NG_ML,SERUM_DHT_SUPPRESSION_PCT,SCALP_DHT_SUPPRESSION_PCT"
        );
        assert_eq!(lines[2], "1,2,40,20");

        let doses = std::fs::read_to_string(dir.join("doses.csv")).unwrap();
        assert_eq!(doses.lines().nth(1), Some("0,0.5"));

        let saved: RunReport =
            serde_json::from_str(&std::fs::read_to_string(dir.join("summary.json")).unwrap()).unwrap();
        assert_eq!(saved.schedule, "[0.5, 1d] x 2d");
        assert_eq!(saved.summary, report.summary);

        assert!(dir.join("simulation_report.md").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
