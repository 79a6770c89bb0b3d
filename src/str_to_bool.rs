/// Strict boolean literals, the same set accepted by most config and flag libraries.
/// Anything else is rejected rather than guessed at.
pub fn str_to_bool(src: &str) -> Option<bool> {
    match src {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_to_bool() {
        for yes in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(str_to_bool(yes), Some(true), "{yes}");
        }
        for no in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(str_to_bool(no), Some(false), "{no}");
        }
        for bad in ["", "yes", "no", "tRUE", "2", " true", "on"] {
            assert_eq!(str_to_bool(bad), None, "{bad}");
        }
    }
}
