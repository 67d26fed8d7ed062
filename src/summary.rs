/// Maximum number of content characters carried into a summary before the
/// ellipsis is appended.
const MAX_SUMMARY_CHARS: usize = 200;

/// derive_summary
///
/// Produces the bounded-length preview stored alongside a blog's content.
/// Content of 200 characters or fewer is returned unchanged; longer content
/// is cut to its first 200 characters, right-trimmed, and suffixed with
/// "...". Counting is by character so multi-byte text never splits inside a
/// code point.
pub fn derive_summary(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    if content.chars().count() <= MAX_SUMMARY_CHARS {
        return content.to_string();
    }

    let cut: String = content.chars().take(MAX_SUMMARY_CHARS).collect();
    format!("{}...", cut.trim_end())
}
