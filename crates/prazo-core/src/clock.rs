use chrono::{DateTime, Local, TimeZone, Utc};

pub fn format_clock<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%H:%M:%S").to_string()
}

/// Local wall-clock rendering used next to each task.
pub fn format_local(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    #[test]
    fn clock_pads_fields() {
        let tz = FixedOffset::east_opt(0).expect("offset");
        let now = tz
            .with_ymd_and_hms(2026, 3, 1, 7, 5, 9)
            .single()
            .expect("valid time");
        assert_eq!(format_clock(&now), "07:05:09");
    }
}
