/// Parse a boolean flag from an optional string value
pub fn parse_flag(value: Option<&String>, default: bool) -> bool {
    match value {
        Some(v) => {
            let t = v.trim().to_lowercase();
            if t.is_empty() {
                default
            } else {
                matches!(t.as_str(), "1" | "true" | "yes" | "on")
            }
        }
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_values() {
        assert!(parse_flag(Some(&"TRUE".to_string()), false));
        assert!(!parse_flag(Some(&"off".to_string()), true));
        assert!(parse_flag(Some(&"  ".to_string()), true));
        assert!(!parse_flag(None, false));
    }
}
