//! Byte-count formatting for sizes and quotas
//!
//! Uses decimal (1000-based) units, the convention file browsers and
//! storage providers use when reporting quotas.

const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];

/// Formats a byte count for display, e.g. `245000` → `"245 KB"`
///
/// Kilobytes are shown without decimals, megabytes with one and larger
/// units with two.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "Zero KB".to_string();
    }
    if bytes < 1000 {
        return if bytes == 1 {
            "1 byte".to_string()
        } else {
            format!("{bytes} bytes")
        };
    }

    let mut value = bytes as f64 / 1000.0;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    match unit {
        0 => format!("{:.0} {}", value, UNITS[unit]),
        1 => format!("{:.1} {}", value, UNITS[unit]),
        _ => format!("{:.2} {}", value, UNITS[unit]),
    }
}
