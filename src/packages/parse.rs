//! Small helpers shared by the backend output parsers.

/// Value of the first `Key : value` line in `text`.
///
/// Leading indentation and any spacing before the colon are ignored, which
/// covers `pacman -Si`, `snap info` and `flatpak info` layouts alike.
pub fn field_value(text: &str, key: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let rest = line.trim_start().strip_prefix(key)?;
        let value = rest.trim_start().strip_prefix(':')?;
        Some(value.trim().to_string())
    })
}

/// `name version - description`, the shape every search line is normalized to
pub fn search_line(name: &str, version: &str, description: &str) -> String {
    let head = format!("{} {}", name.trim(), version.trim());
    let description = description.trim();
    if description.is_empty() {
        head.trim_end().to_string()
    } else {
        format!("{} - {}", head.trim_end(), description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_value_handles_padded_keys() {
        let text = "Repository      : extra\nVersion         : 3.3.0-1\nDescription     : x";
        assert_eq!(field_value(text, "Version").as_deref(), Some("3.3.0-1"));
        assert_eq!(field_value(text, "Missing"), None);
    }

    #[test]
    fn field_value_does_not_match_longer_keys() {
        let text = "Versions: nope\n  Version: 2";
        assert_eq!(field_value(text, "Version").as_deref(), Some("2"));
    }

    #[test]
    fn search_line_omits_empty_parts() {
        assert_eq!(search_line("htop", "3.3.0-1", "viewer"), "htop 3.3.0-1 - viewer");
        assert_eq!(search_line("htop", "3.3.0-1", "  "), "htop 3.3.0-1");
        assert_eq!(search_line("htop", "", ""), "htop");
    }
}
