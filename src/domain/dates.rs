use chrono::{Datelike, Local, NaiveDate};

/// Service dates are carried as day/month/year text ("15/03/2025"), the form
/// they are displayed and persisted in. Date pickers and range filters use the
/// year-month-day form instead; conversion between the two is a pure textual
/// part swap, so any valid date string survives a round trip unchanged.
///
/// Convert a display date (D/M/Y) to the picker form (Y-M-D).
/// Input already in picker form passes through; anything else malformed
/// yields the empty string.
pub fn to_picker_date(display: &str) -> String {
    if display.is_empty() {
        return String::new();
    }
    if is_picker_shaped(display) {
        return display.to_string();
    }

    let parts: Vec<&str> = display.split('/').collect();
    if parts.len() != 3 {
        return String::new();
    }
    format!("{}-{}-{}", parts[2], parts[1], parts[0])
}

/// Convert a picker date (Y-M-D) back to the display form (D/M/Y).
/// Input without three dash-separated parts is returned unchanged.
pub fn from_picker_date(picker: &str) -> String {
    if picker.is_empty() {
        return String::new();
    }

    let parts: Vec<&str> = picker.split('-').collect();
    if parts.len() != 3 {
        return picker.to_string();
    }
    format!("{}/{}/{}", parts[2], parts[1], parts[0])
}

/// Parse a display date (D/M/Y) into a calendar date for range comparisons.
/// Returns None for text that does not name a valid date.
pub fn parse_display_date(display: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = display.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let year: i32 = parts[2].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Today's date in display form, used when opening a fresh order draft.
pub fn today_display() -> String {
    let today = Local::now().date_naive();
    format!("{:02}/{:02}/{}", today.day(), today.month(), today.year())
}

fn is_picker_shaped(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit())
}
