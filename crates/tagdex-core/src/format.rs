/// Column width used for sizes in listings.
pub const SIZE_WIDTH: usize = 6;

const UNITS: &[char] = &['K', 'M', 'G', 'T', 'P', 'E', 'Z', 'Y'];

/// Human readable byte count with binary units, e.g. `1234 -> "1.2K"`.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{}B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = *next;
    }
    format!("{:.1}{}", value, unit)
}

/// [`format_size`] right-aligned to [`SIZE_WIDTH`] columns.
pub fn format_size_padded(bytes: u64) -> String {
    format!("{:>width$}", format_size(bytes), width = SIZE_WIDTH)
}
