//! Printable rendering of the invisible code points.
//!
//! Some transports (JSON viewers, chat tools) strip or mangle zero-width
//! characters. These helpers swap each of them for a literal `\uXXXX`
//! sequence and back, so a carrier can travel as plain ASCII-visible text.

/// Invisible code points used by carriers, with their literal spellings.
const INVISIBLE: [(char, &str); 5] = [
    ('\u{200B}', "\\u200b"),
    ('\u{200C}', "\\u200c"),
    ('\u{200D}', "\\u200d"),
    ('\u{2060}', "\\u2060"),
    ('\u{FEFF}', "\\uFEFF"),
];

/// Replaces every invisible carrier character with its `\uXXXX` spelling.
pub fn escape_invisible(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        match INVISIBLE.iter().find(|(ch, _)| *ch == c) {
            Some((_, literal)) => out.push_str(literal),
            None => out.push(c),
        }
    }
    out
}

/// Turns `\uXXXX` spellings of the carrier characters back into the
/// characters. Matching is case-insensitive; any other backslash
/// sequence is left alone.
pub fn unescape_invisible(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate.get(..6).and_then(|seq| {
            INVISIBLE
                .iter()
                .find(|(_, literal)| literal.eq_ignore_ascii_case(seq))
                .map(|(ch, _)| *ch)
        });
        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &candidate[6..];
            }
            None => {
                out.push('\\');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_all_invisible() {
        let text = "a\u{200B}\u{200C}\u{200D}\u{2060}\u{FEFF}b";
        assert_eq!(
            escape_invisible(text),
            "a\\u200b\\u200c\\u200d\\u2060\\uFEFFb"
        );
    }

    #[test]
    fn test_unescape_case_insensitive() {
        assert_eq!(unescape_invisible("\\U200B\\ufeff\\u200D"), "\u{200B}\u{FEFF}\u{200D}");
        assert_eq!(unescape_invisible("x\\u2060y"), "x\u{2060}y");
    }

    #[test]
    fn test_unescape_leaves_other_sequences() {
        assert_eq!(unescape_invisible("\\u0041 \\u20"), "\\u0041 \\u20");
        assert_eq!(unescape_invisible("no escapes"), "no escapes");
        assert_eq!(unescape_invisible("end\\"), "end\\");
    }

    #[test]
    fn test_escape_unescape_inverse() {
        let text = "Hi\u{FEFF}\u{200B}\u{200D}\u{2060}\u{200B}\u{FEFF} \u{00E9}";
        assert_eq!(unescape_invisible(&escape_invisible(text)), text);
    }
}
