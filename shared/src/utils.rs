// Display helpers for values that may be undefined during an indicator's warm-up.

/// Renders `value` with `decimals` fraction digits, or `-` when it is undefined
/// or not a finite number. Undefined values are never shown as zero.
pub fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_defined_values() {
        assert_eq!(format_optional(Some(1.23456), 2), "1.23");
        assert_eq!(format_optional(Some(0.0), 4), "0.0000");
    }

    #[test]
    fn undefined_values_render_as_dash() {
        assert_eq!(format_optional(None, 2), "-");
        assert_eq!(format_optional(Some(f64::NAN), 2), "-");
    }
}
