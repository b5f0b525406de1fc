use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Normalizes a display name to Unicode NFC.
///
/// Two names that differ only in their combining-character encoding normalize to the
/// same string, so anything derived from the result (such as an accent color) agrees.
///
/// # Examples
///
/// ```
/// use radiolist::foundation::utils::normalize_name;
///
/// assert_eq!(normalize_name("Cafe\u{301}"), "Caf\u{e9}");
/// ```
pub fn normalize_name(input: &str) -> String {
    input.nfc().collect()
}

/// Escapes text for use in HTML element content and quoted attribute values.
///
/// # Examples
///
/// ```
/// use radiolist::foundation::utils::escape_html;
///
/// assert_eq!(escape_html("Tom & Jerry's <b>"), "Tom &amp; Jerry&#39;s &lt;b&gt;");
/// ```
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Shortens a name to at most `max` user-perceived characters, appending an ellipsis
/// when anything was cut.
///
/// # Examples
///
/// ```
/// use radiolist::foundation::utils::truncate_graphemes;
///
/// assert_eq!(truncate_graphemes("KALX - Night Owls", 6), "KALX -…");
/// assert_eq!(truncate_graphemes("Short", 10), "Short");
/// ```
pub fn truncate_graphemes(input: &str, max: usize) -> String {
    let mut graphemes = input.graphemes(true);
    let head: String = graphemes.by_ref().take(max).collect();
    if graphemes.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_combining_marks_together() {
        let name = "e\u{301}e\u{301}e\u{301}";
        assert_eq!(truncate_graphemes(name, 2), "e\u{301}e\u{301}…");
    }

    #[test]
    fn test_escape_leaves_plain_text_alone() {
        assert_eq!(escape_html("Night Owls 2024"), "Night Owls 2024");
    }
}
