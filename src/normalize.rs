//! Page text normalization.

/// Clean raw extracted page text.
///
/// Removes C0 control characters (except tab and newline) and DEL, and
/// folds `\r\n` and lone `\r` into `\n`. Never fails; empty input yields an
/// empty string.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\t' | '\n' => out.push(c),
            c if is_stripped_control(c) => {}
            c => out.push(c),
        }
    }

    out
}

/// C0 controls other than tab/LF/CR, plus DEL.
fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_line_endings() {
        assert_eq!(normalize_text("a\r\nb\rc\nd"), "a\nb\nc\nd");
        assert_eq!(normalize_text("\r\r\n"), "\n\n");
    }

    #[test]
    fn test_strips_controls_keeps_tab() {
        assert_eq!(normalize_text("Chap\u{0}ter\t1\u{7F}\u{1B}"), "Chapter\t1");
        assert_eq!(normalize_text("x\u{0B}y\u{0C}z"), "xyz");
    }

    #[test]
    fn test_preserves_unicode() {
        assert_eq!(normalize_text("第一章 总论\r\n"), "第一章 总论\n");
    }
}
