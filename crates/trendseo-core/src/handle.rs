/// Maximum length of a generated URL handle, in characters.
const MAX_HANDLE_CHARS: usize = 80;

/// Build a URL handle from a keyword.
///
/// Lowercases, transliterates `æ`/`ø`/`å`, drops punctuation other than `-`
/// and `_`, joins whitespace runs with `-`, trims dashes from both ends, and
/// caps the result at 80 characters.
#[must_use]
pub fn create_handle(keyword: &str) -> String {
    let transliterated = keyword
        .to_lowercase()
        .replace('æ', "ae")
        .replace('ø', "oe")
        .replace('å', "aa");

    let cleaned: String = transliterated
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let joined = cleaned.split_whitespace().collect::<Vec<_>>().join("-");
    joined
        .trim_matches('-')
        .chars()
        .take(MAX_HANDLE_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transliterates_danish_letters() {
        assert_eq!(create_handle("Kageskraber i Stål"), "kageskraber-i-staal");
        assert_eq!(create_handle("Øl & Æbler"), "oel-aebler");
    }

    #[test]
    fn strips_punctuation_and_outer_dashes() {
        assert_eq!(create_handle("  -Bedste køkken!! "), "bedste-koekken");
    }

    #[test]
    fn keeps_inner_dashes() {
        assert_eq!(create_handle("e-sport headset"), "e-sport-headset");
    }

    #[test]
    fn caps_length() {
        let long = "ord ".repeat(40);
        assert_eq!(create_handle(&long).chars().count(), 80);
    }

    #[test]
    fn empty_keyword_gives_empty_handle() {
        assert_eq!(create_handle(""), "");
    }
}
