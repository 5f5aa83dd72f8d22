//! Reboot schedule validation.

use super::error::ArgumentError;

/// Accept the schedules `shutdown` understands: `now`, `+<minutes>`, `HH:MM`.
///
/// Everything else is rejected so a caller cannot smuggle an option such as
/// `-c` or `-h` into the reboot facility through the schedule slot.
pub fn validate_schedule(when: &str) -> Result<(), ArgumentError> {
    let valid = when == "now"
        || when
            .strip_prefix('+')
            .is_some_and(|minutes| is_digits(minutes, 1..=5))
        || is_clock_time(when);
    if valid {
        Ok(())
    } else {
        Err(ArgumentError::InvalidSchedule(when.to_string()))
    }
}

/// The message lands in the facility's argument vector after the schedule;
/// one that reads as an option would be parsed as one.
pub fn validate_message(message: &str) -> Result<(), ArgumentError> {
    if message.starts_with('-') {
        return Err(ArgumentError::OptionLikeMessage);
    }
    Ok(())
}

fn is_digits(s: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_clock_time(s: &str) -> bool {
    let Some((hours, minutes)) = s.split_once(':') else {
        return false;
    };
    if !is_digits(hours, 1..=2) || !is_digits(minutes, 2..=2) {
        return false;
    }
    matches!((hours.parse::<u8>(), minutes.parse::<u8>()), (Ok(h), Ok(m)) if h < 24 && m < 60)
}
