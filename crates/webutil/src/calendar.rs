use crate::number::splice_str;

// Top-row digits and the numeric keypad.
fn is_digit_key(key_code: u32) -> bool {
    matches!(key_code, 48..=57 | 96..=105)
}

/// `DD/MM/YYYY` input mask, run after a key press.
///
/// Returns the rewritten value when slashes had to be inserted, `None` when the value should
/// stay as typed.
pub fn format_calendar_input(value: &str, key_code: u32) -> Option<String> {
    if !is_digit_key(key_code) || value.contains(['-', '.']) {
        return None;
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 2 {
        return None;
    }

    let mut out = value.to_string();
    if chars[2] != '/' {
        out = splice_str(&out, 2, 0, "/");
    }
    if chars.len() > 4 && chars[4] != '/' && chars.get(5) != Some(&'/') {
        out = splice_str(&out, 5, 0, "/");
    }
    (out != value).then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_day_and_month_separators() {
        assert_eq!(format_calendar_input("120", 48).as_deref(), Some("12/0"));
        assert_eq!(format_calendar_input("12/052", 50).as_deref(), Some("12/05/2"));
        assert_eq!(format_calendar_input("1205", 99).as_deref(), Some("12/05"));
        assert_eq!(format_calendar_input("12/05/2024", 52), None);
    }

    #[test]
    fn ignores_non_digit_keys_and_other_formats() {
        assert_eq!(format_calendar_input("120", 65), None);
        assert_eq!(format_calendar_input("12-05", 48), None);
        assert_eq!(format_calendar_input("12.05", 48), None);
        assert_eq!(format_calendar_input("1", 49), None);
    }
}
