use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// At least one uppercase letter
    pub static ref UPPERCASE_REGEX: Regex = Regex::new(r"\p{Lu}").unwrap();

    /// At least one lowercase letter
    pub static ref LOWERCASE_REGEX: Regex = Regex::new(r"\p{Ll}").unwrap();

    /// At least one decimal digit
    pub static ref DIGIT_REGEX: Regex = Regex::new(r"[0-9]").unwrap();

    /// At least one character that is neither a letter, a digit nor whitespace
    /// - Valid: "!", "#", "_", "€"
    /// - Invalid: "a", "7", " "
    pub static ref SYMBOL_REGEX: Regex = Regex::new(r"[^\p{L}\p{N}\s]").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_regex() {
        assert!(SYMBOL_REGEX.is_match("!"));
        assert!(SYMBOL_REGEX.is_match("abc_"));
        assert!(SYMBOL_REGEX.is_match("cena€"));
        assert!(!SYMBOL_REGEX.is_match("abc123"));
        assert!(!SYMBOL_REGEX.is_match("with space"));
    }

    #[test]
    fn test_case_regexes() {
        assert!(UPPERCASE_REGEX.is_match("aBc"));
        assert!(!UPPERCASE_REGEX.is_match("abc1!"));
        assert!(LOWERCASE_REGEX.is_match("ABc"));
        assert!(!LOWERCASE_REGEX.is_match("ABC1!"));
        assert!(DIGIT_REGEX.is_match("a1"));
        assert!(!DIGIT_REGEX.is_match("abc"));
    }
}
