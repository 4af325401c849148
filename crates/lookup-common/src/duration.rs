//! Human-readable durations such as `"2h"` or `"1d12h"`.

use thiserror::Error;

/// Errors produced while parsing a duration string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,
    #[error("expected a number before '{0}'")]
    MissingNumber(char),
    #[error("unknown duration unit '{0}' (expected s, m, h, d or w)")]
    UnknownUnit(char),
    #[error("duration is too large")]
    Overflow,
}

fn unit_seconds(unit: char) -> Option<u64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(60 * 60),
        'd' => Some(24 * 60 * 60),
        'w' => Some(7 * 24 * 60 * 60),
        _ => None,
    }
}

/// Parse a duration into whole seconds.
///
/// A bare integer is taken as seconds. Otherwise the input is one or more
/// `<integer><unit>` groups, summed: `"90s"`, `"2h"`, `"1d12h"`, `"1w"`.
pub fn parse_duration_secs(input: &str) -> Result<u64, DurationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DurationError::Empty);
    }

    let mut total: u64 = 0;
    let mut number: Option<u64> = None;

    for c in input.chars() {
        if let Some(digit) = c.to_digit(10) {
            let current = number.unwrap_or(0);
            number = Some(
                current
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(u64::from(digit)))
                    .ok_or(DurationError::Overflow)?,
            );
            continue;
        }

        let scale = unit_seconds(c).ok_or(DurationError::UnknownUnit(c))?;
        let value = number.take().ok_or(DurationError::MissingNumber(c))?;
        total = value
            .checked_mul(scale)
            .and_then(|secs| total.checked_add(secs))
            .ok_or(DurationError::Overflow)?;
    }

    // Trailing digits without a unit are seconds
    if let Some(value) = number {
        total = total.checked_add(value).ok_or(DurationError::Overflow)?;
    }

    Ok(total)
}
