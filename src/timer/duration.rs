//! Parsing of `[[H:]M:]S` duration arguments.

use super::countdown::TimeValue;

/// Maximum number of colon-separated groups (hours, minutes, seconds).
const MAX_GROUPS: usize = 3;

/// Parses a duration argument of up to three colon-separated groups.
///
/// Groups are right-aligned: the last group is seconds, the one before it
/// minutes, the first of three is hours. Every group except the leftmost is
/// clamped to 59. The leftmost group is not clamped; when it is the seconds
/// or minutes group its overflow is carried into the higher units, so
/// `"90"` means one minute thirty.
///
/// Returns `None` if any group is empty or not purely decimal digits, or
/// there are more than three groups. Nothing is partially applied.
#[must_use]
pub fn parse_duration(input: &str) -> Option<TimeValue> {
    let groups: Vec<&str> = input.trim().split(':').collect();
    if groups.len() > MAX_GROUPS {
        return None;
    }

    let mut values = Vec::with_capacity(groups.len());
    for group in &groups {
        if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        values.push(group.parse::<u32>().ok()?);
    }

    match values.as_slice() {
        [s] => {
            let s = *s;
            Some(TimeValue::new(s / 3600, (s % 3600) / 60, s % 60))
        }
        [m, s] => Some(TimeValue::new(m / 60, m % 60, (*s).min(59))),
        [h, m, s] => Some(TimeValue::new(*h, (*m).min(59), (*s).min(59))),
        _ => None,
    }
}
