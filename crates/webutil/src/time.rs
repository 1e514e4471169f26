use regex::Regex;
use std::sync::LazyLock;

static CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)(:[0-5]\d)?$").expect("clock pattern")
});

/// `"13:05"` -> `"01:05PM"`. Strings that are not a 24h clock time come back unchanged;
/// empty input yields `None`.
pub fn local_time(t: &str) -> Option<String> {
    if t.is_empty() {
        return None;
    }
    let Some(caps) = CLOCK_RE.captures(t) else {
        return Some(t.to_string());
    };
    let hour: u32 = caps[1].parse().ok()?;
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    let seconds = caps.get(3).map_or("", |m| m.as_str());
    Some(format!("{hour:02}:{}{seconds}{suffix}", &caps[2]))
}

/// `"09:00 - 17:30"` -> `"09:00AM to 05:30PM"`. Input without a dash is returned as-is.
pub fn format_date(time: &str) -> String {
    if !time.contains('-') {
        return time.to_string();
    }
    let mut parts = time.trim().split('-');
    let mut side = || {
        parts
            .next()
            .and_then(|p| local_time(p.trim()))
            .unwrap_or_default()
    };
    let from = side();
    let to = side();
    format!("{from} to {to}")
}

/// Format `;`-separated opening hours, e.g. `"09:00-12:00;13:00-17:00"`.
pub fn split_times(times: &str) -> String {
    if times.is_empty() || times == "Closed" {
        return times.to_string();
    }
    times
        .split(';')
        .map(format_date)
        .collect::<Vec<_>>()
        .join(" , ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_hour_clock() {
        assert_eq!(local_time(""), None);
        assert_eq!(local_time("00:15").as_deref(), Some("12:15AM"));
        assert_eq!(local_time("09:30").as_deref(), Some("09:30AM"));
        assert_eq!(local_time("12:00").as_deref(), Some("12:00PM"));
        assert_eq!(local_time("23:59:07").as_deref(), Some("11:59:07PM"));
        assert_eq!(local_time("24:00").as_deref(), Some("24:00"));
        assert_eq!(local_time("noon").as_deref(), Some("noon"));
    }

    #[test]
    fn ranges() {
        assert_eq!(format_date("09:00 - 17:30"), "09:00AM to 05:30PM");
        assert_eq!(format_date("all day"), "all day");
        assert_eq!(
            split_times("08:00-12:00;13:00-18:00"),
            "08:00AM to 12:00PM , 01:00PM to 06:00PM"
        );
        assert_eq!(split_times("Closed"), "Closed");
        assert_eq!(split_times(""), "");
    }
}
