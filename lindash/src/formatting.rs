//! Shared formatting utilities for axes, tooltips and legends.

use lindash_common::ValueFormat;

use crate::model::Timestamp;

/// Format a numeric value for display with appropriate scale suffix.
///
/// - Values >= 1G display as "X.XG"
/// - Values >= 1M display as "X.XM"
/// - Values >= 1K display as "X.XK"
/// - Integer values display without decimal places
/// - Other values display with 2 decimal places
pub fn format_value(value: f64) -> String {
    if value.abs() >= 1_000_000_000.0 {
        format!("{:.1}G", value / 1_000_000_000.0)
    } else if value.abs() >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value.abs() >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Format a byte count with binary units.
pub fn format_bytes(value: f64, decimals: u8) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut scaled = value;
    let mut unit = 0;
    while scaled.abs() >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{:.0} {}", scaled, UNITS[0])
    } else {
        format!("{:.*} {}", decimals as usize, scaled, UNITS[unit])
    }
}

/// Format `value` according to a configured policy.
pub fn format_with(format: ValueFormat, decimals: u8, value: f64) -> String {
    match format {
        ValueFormat::Compact => format_value(value),
        ValueFormat::Fixed => format!("{:.*}", decimals as usize, value),
        ValueFormat::Percent => format!("{:.*}%", decimals as usize, value * 100.0),
        ValueFormat::Bytes => format_bytes(value, decimals),
    }
}

/// Build a boxed formatter for a configured policy.
pub fn formatter(format: ValueFormat, decimals: u8) -> Box<dyn Fn(f64) -> String> {
    Box::new(move |v| format_with(format, decimals, v))
}

/// Format a timestamp as UTC wall-clock time.
///
/// `HH:MM:SS`, or `HH:MM` when `with_seconds` is false.
pub fn format_clock(timestamp_ms: Timestamp, with_seconds: bool) -> String {
    let secs_of_day = timestamp_ms.div_euclid(1000).rem_euclid(86_400);
    let (h, m, s) = (secs_of_day / 3600, (secs_of_day / 60) % 60, secs_of_day % 60);
    if with_seconds {
        format!("{:02}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", h, m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(42.0), "42");
        assert_eq!(format_value(3.14159), "3.14");
        assert_eq!(format_value(1500.0), "1.5K");
        assert_eq!(format_value(2500000.0), "2.5M");
        assert_eq!(format_value(-1500.0), "-1.5K");
        assert_eq!(format_value(7_300_000_000.0), "7.3G");
    }

    #[test]
    fn test_format_with_policies() {
        assert_eq!(format_with(ValueFormat::Fixed, 1, 2.345), "2.3");
        assert_eq!(format_with(ValueFormat::Percent, 0, 0.256), "26%");
        assert_eq!(format_with(ValueFormat::Bytes, 1, 1536.0), "1.5 KiB");
        assert_eq!(format_with(ValueFormat::Bytes, 1, 512.0), "512 B");
        assert_eq!(formatter(ValueFormat::Compact, 2)(1500.0), "1.5K");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0, true), "00:00:00");
        assert_eq!(format_clock(3_723_000, true), "01:02:03");
        assert_eq!(format_clock(3_723_000, false), "01:02");
        assert_eq!(format_clock(86_400_000 + 1000, true), "00:00:01");
        assert_eq!(format_clock(-1000, true), "23:59:59");
    }
}
