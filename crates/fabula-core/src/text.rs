/// Indefinite article for `word`: `"an"` before a vowel, `"a"` otherwise
///
/// Only the first letter is inspected, case-insensitively.
pub fn a_or_an(word: &str) -> &'static str {
    match word.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

/// `word` prefixed with its indefinite article
pub fn with_article(word: &str) -> String {
    format!("{} {word}", a_or_an(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consonant_takes_a() {
        assert_eq!(with_article("cat"), "a cat");
        assert_eq!(with_article("taco"), "a taco");
    }

    #[test]
    fn vowel_takes_an() {
        assert_eq!(with_article("owl"), "an owl");
        assert_eq!(with_article("ant"), "an ant");
    }

    #[test]
    fn vowel_check_ignores_case() {
        assert_eq!(a_or_an("Owl"), "an");
        assert_eq!(a_or_an("Elephant"), "an");
        assert_eq!(a_or_an("Bear"), "a");
    }

    #[test]
    fn empty_word_takes_a() {
        assert_eq!(a_or_an(""), "a");
    }
}
