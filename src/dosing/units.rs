use crate::error::ScheduleSyntaxError;

pub const HOURS_PER_DAY: f64 = 24.0;
pub const HOURS_PER_WEEK: f64 = 7.0 * HOURS_PER_DAY;
pub const HOURS_PER_MONTH: f64 = 30.0 * HOURS_PER_DAY;
pub const HOURS_PER_YEAR: f64 = 365.0 * HOURS_PER_DAY;

/// Parse a duration such as `90d`, `16w`, `0.5y` or `12h` into hours.
///
/// A bare number is taken as days. Months and years are fixed 30 and 365 day
/// approximations.
pub fn parse_hours(text: &str) -> Result<f64, ScheduleSyntaxError> {
    let split = text
        .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| ScheduleSyntaxError::InvalidDuration(text.to_string()))?;

    let scale = match unit {
        "" | "d" => HOURS_PER_DAY,
        "h" => 1.0,
        "w" => HOURS_PER_WEEK,
        "mo" => HOURS_PER_MONTH,
        "y" => HOURS_PER_YEAR,
        _ => return Err(ScheduleSyntaxError::InvalidUnit(text.to_string())),
    };

    Ok(value * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_conversions() {
        assert_relative_eq!(parse_hours("12h").unwrap(), 12.0);
        assert_relative_eq!(parse_hours("2d").unwrap(), 48.0);
        assert_relative_eq!(parse_hours("16w").unwrap(), 16.0 * 168.0);
        assert_relative_eq!(parse_hours("2mo").unwrap(), 1440.0);
        assert_relative_eq!(parse_hours("0.5y").unwrap(), 4380.0);
    }

    #[test]
    fn test_bare_number_is_days() {
        assert_relative_eq!(parse_hours("3").unwrap(), 72.0);
        assert_relative_eq!(parse_hours("1.5").unwrap(), 36.0);
    }

    #[test]
    fn test_bad_number() {
        assert_eq!(
            parse_hours("d"),
            Err(ScheduleSyntaxError::InvalidDuration("d".to_string()))
        );
        assert_eq!(
            parse_hours(""),
            Err(ScheduleSyntaxError::InvalidDuration(String::new()))
        );
        assert_eq!(
            parse_hours("1.2.3d"),
            Err(ScheduleSyntaxError::InvalidDuration("1.2.3d".to_string()))
        );
    }

    #[test]
    fn test_bad_unit() {
        assert_eq!(
            parse_hours("3m"),
            Err(ScheduleSyntaxError::InvalidUnit("3m".to_string()))
        );
        assert_eq!(
            parse_hours("1dx"),
            Err(ScheduleSyntaxError::InvalidUnit("1dx".to_string()))
        );
    }
}
