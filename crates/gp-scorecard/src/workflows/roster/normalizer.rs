use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const APOSTROPHE_VARIANTS: [char; 6] = ['\u{2018}', '\u{2019}', '\u{201b}', '\u{2032}', '`', '\u{b4}'];
const DASH_VARIANTS: [char; 3] = ['\u{2013}', '\u{2014}', '\u{2012}'];

/// Display form of a presenter name: trimmed, single spaced, each word title-cased.
pub fn normalize_name(value: &str) -> String {
    strip_invisible(value)
        .split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Key used only for comparisons: accents dropped, lowercase, punctuation variants unified.
pub fn comparison_key(value: &str) -> String {
    let folded: String = strip_invisible(value)
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .map(|ch| {
            if APOSTROPHE_VARIANTS.contains(&ch) {
                '\''
            } else if DASH_VARIANTS.contains(&ch) {
                '-'
            } else {
                ch
            }
        })
        .collect();

    folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn strip_invisible(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
