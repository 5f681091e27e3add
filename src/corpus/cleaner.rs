/// Normalise corpus text before chunking.
///
/// Whitespace runs collapse to one space, then every character that is not a
/// word character, whitespace, Bengali (U+0980..=U+09FF) or one of
/// `. , ; : ! ? ( ) -` becomes a space, then the result is trimmed. The
/// replacement step runs after the collapse, so it can leave double spaces.
pub fn clean_text(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                collapsed.push(' ');
                in_space = true;
            }
        } else {
            collapsed.push(c);
            in_space = false;
        }
    }

    let replaced: String = collapsed
        .chars()
        .map(|c| if is_allowed(c) { c } else { ' ' })
        .collect();

    replaced.trim().to_string()
}

fn is_allowed(c: char) -> bool {
    c.is_alphanumeric()
        || c == '_'
        || c.is_whitespace()
        || ('\u{0980}'..='\u{09FF}').contains(&c)
        || matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '(' | ')' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_and_strips_symbols() {
        assert_eq!(clean_text("Hello,   World! @#"), "Hello, World!");
    }

    #[test]
    fn test_keeps_bengali() {
        let text = "বাংলাদেশ  সংবিধান।";
        // U+0964 (danda) lies outside the Bengali block and is replaced
        assert_eq!(clean_text(text), "বাংলাদেশ সংবিধান");
        assert_eq!(clean_text("ধারা ৫"), "ধারা ৫");
    }

    #[test]
    fn test_replacement_can_leave_double_space() {
        assert_eq!(clean_text("a @ b"), "a   b");
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text(" \n\t "), "");
    }

    #[test]
    fn test_keeps_legal_punctuation() {
        assert_eq!(
            clean_text("Section 5(1)-(a); see: s. 7?"),
            "Section 5(1)-(a); see: s. 7?"
        );
    }
}
