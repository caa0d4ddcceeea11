pub mod grammar;
pub mod item;
pub mod units;

use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::error::ScheduleSyntaxError;

pub use grammar::parse_schedule;
pub use item::ScheduleItem;
pub use units::parse_hours;

/// A parsed dosing schedule plus the edge detector used while stepping
/// through it.
#[derive(Debug, Clone)]
pub struct Schedule {
    root: ScheduleItem,
    current: Option<Vec<usize>>,
}

impl Schedule {
    pub fn parse(text: &str) -> Result<Self, ScheduleSyntaxError> {
        let root = parse_schedule(text)?;
        debug!("Parsed schedule: {}", root);
        Ok(Self::from_root(root))
    }

    pub fn from_root(root: ScheduleItem) -> Self {
        Self { root, current: None }
    }

    pub fn root(&self) -> &ScheduleItem {
        &self.root
    }

    /// Hours from the first dose to the end of the last group.
    pub fn total_run_time(&self) -> f64 {
        self.root.duration()
    }

    /// Dose to administer at `time`, fired once per occurrence.
    ///
    /// Returns the dose only on the first call that lands in a new occurrence
    /// of a leaf; later calls inside the same occurrence return 0. Leaving the
    /// schedule clears the remembered occurrence.
    pub fn dose_at(&mut self, time: f64) -> f64 {
        match self.root.item_at(time) {
            None => {
                self.current = None;
                0.0
            }
            Some((dose, path)) => {
                if self.current.as_ref() == Some(&path) {
                    0.0
                } else {
                    self.current = Some(path);
                    dose
                }
            }
        }
    }

    /// Forget the last occurrence so the schedule can be replayed from scratch.
    pub fn reset(&mut self) {
        self.current = None;
    }
}

impl FromStr for Schedule {
    type Err = ScheduleSyntaxError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
