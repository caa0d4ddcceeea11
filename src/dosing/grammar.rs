//! Recursive-descent parser for dosing schedules.
//!
//! ```text
//! schedule := group ("," group)*
//! group    := "[" entry ("," entry)* "]" ("x" duration)?
//! entry    := dose "," (duration | weekdays) | group
//! ```
//!
//! Whitespace is ignored. Top-level groups run one after another; a group
//! repeats its entries until its `x` duration is used up.

use log::warn;

use super::item::ScheduleItem;
use super::units::{parse_hours, HOURS_PER_DAY};
use crate::error::ScheduleSyntaxError;

/// Weekday codes in mask order. Every code starts with its only capital.
pub const WEEKDAYS: [&str; 7] = ["Su", "M", "Tu", "W", "Th", "F", "Sa"];

/// Stand-in for durations written as zero.
const ZERO_DURATION_PLACEHOLDER: f64 = HOURS_PER_DAY;

pub fn parse_schedule(text: &str) -> Result<ScheduleItem, ScheduleSyntaxError> {
    let text: String = text.split_whitespace().collect();
    if text.is_empty() {
        return Err(ScheduleSyntaxError::EmptyInput);
    }

    let groups = split_top_level(&text)?;
    if groups.is_empty() {
        return Err(ScheduleSyntaxError::EmptyInput);
    }

    let children = groups
        .into_iter()
        .map(parse_group)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ScheduleItem::cycle(children, None))
}

/// Split on the commas that are not inside brackets. Empty pieces are dropped.
fn split_top_level(text: &str) -> Result<Vec<&str>, ScheduleSyntaxError> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ScheduleSyntaxError::UnbalancedBrackets(text.to_string()))?;
            }
            ',' if depth == 0 => {
                if i > start {
                    pieces.push(&text[start..i]);
                }
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ScheduleSyntaxError::UnbalancedBrackets(text.to_string()));
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    Ok(pieces)
}

/// Byte index of the bracket closing the one that opens `text`.
fn matching_close(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_group(token: &str) -> Result<ScheduleItem, ScheduleSyntaxError> {
    if !token.starts_with('[') {
        return Err(ScheduleSyntaxError::ExpectedGroup(token.to_string()));
    }
    let close = matching_close(token)
        .ok_or_else(|| ScheduleSyntaxError::UnbalancedBrackets(token.to_string()))?;
    let body = &token[1..close];
    let suffix = &token[close + 1..];

    let declared = if suffix.is_empty() {
        None
    } else if let Some(duration) = suffix.strip_prefix(&['x', 'X'][..]) {
        if duration.is_empty() {
            return Err(ScheduleSyntaxError::MissingDuration(token.to_string()));
        }
        Some(nonzero(parse_hours(duration)?))
    } else {
        return Err(ScheduleSyntaxError::TrailingInput(suffix.to_string()));
    };

    let entries = split_top_level(body)?;
    if entries.is_empty() {
        return Err(ScheduleSyntaxError::EmptyGroup);
    }

    Ok(ScheduleItem::cycle(parse_entries(&entries)?, declared))
}

fn parse_entries(entries: &[&str]) -> Result<Vec<ScheduleItem>, ScheduleSyntaxError> {
    let mut children = Vec::with_capacity(entries.len() / 2 + 1);
    let mut tokens = entries.iter().copied();

    while let Some(token) = tokens.next() {
        if token.starts_with('[') {
            children.push(parse_group(token)?);
            continue;
        }

        let amount = parse_dose(token)?;
        let span = tokens
            .next()
            .ok_or_else(|| ScheduleSyntaxError::UnpairedDose(token.to_string()))?;

        if is_weekday_list(span) {
            children.push(weekly(amount, parse_weekdays(span)?));
        } else {
            children.push(ScheduleItem::dose(amount, nonzero(parse_hours(span)?)));
        }
    }

    Ok(children)
}

fn parse_dose(token: &str) -> Result<f64, ScheduleSyntaxError> {
    let amount: f64 = token
        .parse()
        .map_err(|_| ScheduleSyntaxError::InvalidDose(token.to_string()))?;
    if !amount.is_finite() {
        return Err(ScheduleSyntaxError::InvalidDose(token.to_string()));
    }
    if amount < 0.0 {
        return Err(ScheduleSyntaxError::NegativeDose(token.to_string()));
    }
    Ok(amount)
}

fn nonzero(hours: f64) -> f64 {
    if hours == 0.0 {
        warn!(
            "Zero duration in schedule, using {} h instead",
            ZERO_DURATION_PLACEHOLDER
        );
        ZERO_DURATION_PLACEHOLDER
    } else {
        hours
    }
}

fn is_weekday_list(span: &str) -> bool {
    span.starts_with(|ch: char| ch.is_ascii_uppercase())
        && !span.chars().any(|ch| ch.is_ascii_digit())
}

/// Read a run of weekday codes such as `MWF` or `SaSuTuTh` into a Sunday-first mask.
pub fn parse_weekdays(span: &str) -> Result<[bool; 7], ScheduleSyntaxError> {
    let starts: Vec<usize> = span
        .char_indices()
        .filter(|(_, ch)| ch.is_ascii_uppercase())
        .map(|(i, _)| i)
        .collect();
    if starts.first() != Some(&0) {
        return Err(ScheduleSyntaxError::InvalidWeekday(span.to_string()));
    }

    let mut week = [false; 7];
    for (n, &start) in starts.iter().enumerate() {
        let end = starts.get(n + 1).copied().unwrap_or(span.len());
        let code = &span[start..end];
        let day = WEEKDAYS
            .iter()
            .position(|d| *d == code)
            .ok_or_else(|| ScheduleSyntaxError::InvalidWeekday(code.to_string()))?;
        week[day] = true;
    }
    Ok(week)
}

/// Expand a weekday mask into one week of (dose, wait) leaves.
///
/// The week is rotated to begin the day after the first active day, so that
/// day's dose ends up first and is taken at the start of the cycle.
fn weekly(amount: f64, mut week: [bool; 7]) -> ScheduleItem {
    let first = week.iter().position(|&active| active).unwrap_or(0);
    week.rotate_left((first + 1) % 7);

    let mut children = Vec::new();
    let mut wait = 0.0;
    for active in week {
        wait += HOURS_PER_DAY;
        if active {
            children.push(ScheduleItem::dose(amount, wait));
            wait = 0.0;
        }
    }
    ScheduleItem::cycle(children, None)
}
