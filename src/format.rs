const SECONDS_IN_HOUR: u64 = 60 * 60;

/// Formats a playback position as `m:ss`, or `h:mm:ss` from one hour up.
/// Negative and non-finite inputs render as `0:00`.
pub fn format_playback_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };

    let hours = total / SECONDS_IN_HOUR;
    let minutes = (total % SECONDS_IN_HOUR) / 60;
    let seconds = (total % SECONDS_IN_HOUR) % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Groups the digits of an integer string in threes separated by spaces:
/// `"1234567"` becomes `"1 234 567"`. Returns `None` when the input is not an integer.
pub fn split_into_thousand_parts(value: &str) -> Option<String> {
    let number: i64 = value.trim().parse().ok()?;
    let digits = number.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if number < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    Some(grouped)
}
