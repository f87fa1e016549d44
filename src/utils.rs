//! Utility functions for file naming and log excerpts

use regex::Regex;
use std::sync::LazyLock;

/// Characters that are unsafe in file names on at least one supported platform
#[allow(clippy::expect_used)]
static PATH_HOSTILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).expect("static regex is valid"));

/// Make a string safe to use as (part of) a file name
///
/// Each of `\ / * ? : " < > |` is replaced with `_` and surrounding whitespace is
/// trimmed. The function is idempotent: sanitizing a sanitized name changes nothing.
///
/// # Examples
///
/// ```
/// use unlock_bench::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename(" shoes/boots "), "shoes_boots");
/// assert_eq!(sanitize_filename("a:b?c"), "a_b_c");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    PATH_HOSTILE.replace_all(name, "_").trim().to_string()
}

/// Artifact file name for one attempt: `<sanitized category>_<index>_<seq>.html`
///
/// Category alone is not unique; the target index and attempt sequence are.
pub fn artifact_name(category: &str, target_index: usize, attempt_seq: usize) -> String {
    format!(
        "{}_{}_{}.html",
        sanitize_filename(category),
        target_index,
        attempt_seq
    )
}

/// Dataset name derived from an input path: the sanitized file stem
pub fn dataset_name(path: &std::path::Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "dataset".to_string());
    sanitize_filename(&stem)
}

/// Cut `text` down to at most `max_chars` characters, on a char boundary
///
/// Used to keep raw response bodies and error text in the diagnostic log bounded.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Lossy UTF-8 excerpt of a raw body, with line breaks flattened so it stays on one log line
pub fn body_excerpt(body: &[u8], max_chars: usize) -> String {
    let text = String::from_utf8_lossy(body);
    excerpt(&text, max_chars)
        .replace(['\r', '\n'], " ")
        .trim()
        .to_string()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn sanitize_replaces_every_hostile_character() {
        assert_eq!(
            sanitize_filename(r#"a\b/c*d?e:f"g<h>i|j"#),
            "a_b_c_d_e_f_g_h_i_j"
        );
    }

    #[test]
    fn sanitize_trims_whitespace() {
        assert_eq!(sanitize_filename("  product page \t"), "product page");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for input in [
            "plain",
            " spaced / slashed ",
            "<<weird>>|name?",
            "",
            "类型:搜索",
            "already_clean_1",
        ] {
            let once = sanitize_filename(input);
            let twice = sanitize_filename(&once);
            assert_eq!(once, twice, "sanitize should be idempotent for {input:?}");
        }
    }

    #[test]
    fn artifact_names_are_unique_per_index_and_sequence() {
        let a = artifact_name("shop", 1, 2);
        let b = artifact_name("shop", 2, 1);
        let c = artifact_name("shop", 1, 2);

        assert_eq!(a, "shop_1_2.html");
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn artifact_name_sanitizes_category() {
        assert_eq!(artifact_name(" men/shoes ", 4, 1), "men_shoes_4_1.html");
    }

    #[test]
    fn dataset_name_uses_sanitized_stem() {
        assert_eq!(dataset_name(Path::new("/data/url_walmart.csv")), "url_walmart");
        assert_eq!(dataset_name(Path::new("lists/a:b.csv")), "a_b");
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("hello", 10), "hello");
        assert_eq!(excerpt("hello", 3), "hel");
        assert_eq!(excerpt("访问时间", 2), "访问");
        assert_eq!(excerpt("", 5), "");
    }

    #[test]
    fn body_excerpt_flattens_lines_and_bounds_length() {
        let body = b"<html>\n<body>blocked</body>\r\n</html>";
        assert_eq!(body_excerpt(body, 200), "<html> <body>blocked</body>  </html>");
        assert_eq!(body_excerpt(body, 6), "<html>");
    }

    #[test]
    fn body_excerpt_tolerates_invalid_utf8() {
        let body = [0xff, 0xfe, b'o', b'k'];
        let text = body_excerpt(&body, 10);
        assert!(text.ends_with("ok"));
    }
}
