use std::fmt;

/// A node of a parsed dosing schedule.
///
/// Nodes are built bottom-up and never change afterwards. Repetition is not
/// stored as graph cycles: a `Cycle` simply runs its children again from the
/// start until its own duration is used up.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleItem {
    /// Take `amount` mg, then nothing more for `duration` hours.
    Dose { amount: f64, duration: f64 },
    Cycle(Cycle),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    children: Vec<ScheduleItem>,
    amount: f64,
    /// Length of one pass over `children`, in hours.
    period: f64,
    /// Total length, a whole or fractional number of periods.
    duration: f64,
}

impl ScheduleItem {
    pub fn dose(amount: f64, duration: f64) -> Self {
        ScheduleItem::Dose { amount, duration }
    }

    /// Build a repeating node out of `children`.
    ///
    /// The node lasts `max(declared, period)` hours, where `period` is the sum
    /// of the children's durations. The result is normalized: a wrapper that
    /// adds nothing to its only child is replaced by the child, and child
    /// cycles that run exactly one period are spliced into the parent.
    pub fn cycle(mut children: Vec<ScheduleItem>, declared: Option<f64>) -> Self {
        let period: f64 = children.iter().map(ScheduleItem::duration).sum();
        let duration = declared.map_or(period, |d| d.max(period));

        if children.len() == 1 && children[0].duration() >= duration {
            if let Some(only) = children.pop() {
                return only;
            }
        }

        let children: Vec<ScheduleItem> = children
            .into_iter()
            .flat_map(|child| match child {
                ScheduleItem::Cycle(inner) if inner.duration == inner.period => inner.children,
                other => vec![other],
            })
            .collect();
        let amount = children.iter().map(ScheduleItem::amount).sum();

        ScheduleItem::Cycle(Cycle {
            children,
            amount,
            period,
            duration,
        })
    }

    /// Dose of a leaf, or the summed dose of one pass over a cycle's children.
    /// Informational only.
    pub fn amount(&self) -> f64 {
        match self {
            ScheduleItem::Dose { amount, .. } => *amount,
            ScheduleItem::Cycle(cycle) => cycle.amount,
        }
    }

    pub fn duration(&self) -> f64 {
        match self {
            ScheduleItem::Dose { duration, .. } => *duration,
            ScheduleItem::Cycle(cycle) => cycle.duration,
        }
    }

    /// Length of one repetition. Equals `duration()` for a leaf.
    pub fn period(&self) -> f64 {
        match self {
            ScheduleItem::Dose { duration, .. } => *duration,
            ScheduleItem::Cycle(cycle) => cycle.period,
        }
    }

    pub fn children(&self) -> &[ScheduleItem] {
        match self {
            ScheduleItem::Dose { .. } => &[],
            ScheduleItem::Cycle(cycle) => &cycle.children,
        }
    }

    /// Find the dose in effect `time` hours after this node starts.
    ///
    /// Returns the leaf's dose together with the path of occurrence indices
    /// that led to it. Each path entry is `loops * child_count + child_index`,
    /// so two passes over the same leaf produce different paths.
    pub fn item_at(&self, time: f64) -> Option<(f64, Vec<usize>)> {
        let mut path = Vec::new();
        self.locate(time, &mut path).map(|dose| (dose, path))
    }

    fn locate(&self, time: f64, path: &mut Vec<usize>) -> Option<f64> {
        if !(time >= 0.0 && time < self.duration()) {
            return None;
        }

        let cycle = match self {
            ScheduleItem::Dose { amount, .. } => return Some(*amount),
            ScheduleItem::Cycle(cycle) => cycle,
        };
        if cycle.period <= 0.0 {
            return None;
        }

        let loops = (time / cycle.period).floor() as usize;
        let offset = time % cycle.period;

        let mut start = 0.0;
        for (index, child) in cycle.children.iter().enumerate() {
            let end = start + child.duration();
            if offset < end {
                path.push(loops * cycle.children.len() + index);
                return child.locate(offset - start, path);
            }
            start = end;
        }
        None
    }
}

impl fmt::Display for ScheduleItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleItem::Dose { amount, duration } => write!(f, "{} mg/{} h", amount, duration),
            ScheduleItem::Cycle(cycle) => {
                write!(f, "[")?;
                for (i, child) in cycle.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, "] x {} h", cycle.duration)
            }
        }
    }
}
