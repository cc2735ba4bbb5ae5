//! Tag string normalization.
//!
//! Scraped tag lists arrive comma-separated, sometimes with booru-style escaped
//! parentheses (`makima_\(chainsaw_man\)`). The canonical form is a single line
//! of space-separated tokens.

/// Normalize a free-form tag string into space-separated tokens.
///
/// - commas (and any whitespace after them) become a single space
/// - backslashes directly in front of `(` or `)` are dropped
/// - whitespace runs collapse to one space, and the result is trimmed
///
/// The function is total and idempotent.
///
/// ```rust
/// use meta_export::tags::normalize_tags;
///
/// assert_eq!(normalize_tags("a, b,   c"), "a b c");
/// assert_eq!(normalize_tags(r"makima_\(chainsaw_man\)"), "makima_(chainsaw_man)");
/// ```
pub fn normalize_tags(tags: &str) -> String {
    if tags.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(tags.len());
    // Backslashes are held back until we know whether a parenthesis follows.
    let mut pending_backslashes = 0usize;

    for ch in tags.chars() {
        match ch {
            '\\' => pending_backslashes += 1,
            '(' | ')' => {
                pending_backslashes = 0;
                out.push(ch);
            }
            _ => {
                flush_backslashes(&mut out, &mut pending_backslashes);
                out.push(if ch == ',' { ' ' } else { ch });
            }
        }
    }
    flush_backslashes(&mut out, &mut pending_backslashes);

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn flush_backslashes(out: &mut String, pending: &mut usize) {
    for _ in 0..*pending {
        out.push('\\');
    }
    *pending = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(normalize_tags(""), "");
        assert_eq!(normalize_tags("   \n\t "), "");
    }

    #[test]
    fn commas_become_spaces() {
        assert_eq!(normalize_tags("a, b,   c"), "a b c");
        assert_eq!(normalize_tags("a,b,c"), "a b c");
        assert_eq!(normalize_tags("a,,b"), "a b");
        assert_eq!(normalize_tags("a ,b"), "a b");
        assert_eq!(normalize_tags(", a, "), "a");
    }

    #[test]
    fn escaped_parentheses_are_unescaped() {
        assert_eq!(
            normalize_tags(r"makima_\(chainsaw_man\)"),
            "makima_(chainsaw_man)"
        );
        assert_eq!(
            normalize_tags(r"1girl, asuka_\(evangelion\), red_hair"),
            "1girl asuka_(evangelion) red_hair"
        );
    }

    #[test]
    fn stacked_backslashes_before_paren_are_all_dropped() {
        assert_eq!(normalize_tags(r"x_\\(y\\\)"), "x_(y)");
    }

    #[test]
    fn other_backslashes_are_kept() {
        assert_eq!(normalize_tags(r"path\to, \n"), r"path\to \n");
        assert_eq!(normalize_tags(r"trailing\"), r"trailing\");
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(normalize_tags("  a \t\tb\n\nc  "), "a b c");
        assert_eq!(normalize_tags("a,\n  b"), "a b");
    }

    #[test]
    fn unicode_tags_survive() {
        assert_eq!(normalize_tags("東方, 博麗霊夢"), "東方 博麗霊夢");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "",
            "a, b,   c",
            r"makima_\(chainsaw_man\)",
            r"x_\\(y\\\)",
            r"\\\\",
            r"a\ ,\(b",
            " , ,\t,\n",
            r"end\",
            "東方,  博麗霊夢 , \\(x\\)",
        ];
        for s in samples {
            let once = normalize_tags(s);
            assert_eq!(normalize_tags(&once), once, "not idempotent for {s:?}");
        }
    }
}
