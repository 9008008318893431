//! Turning identifiers and shouted Unicode names into readable labels (made by FontLab https://www.fontlab.com/)

/// Splits a PascalCase identifier into words and title-cases them.
///
/// Word boundaries fall before an uppercase letter that follows a lowercase
/// letter or digit, and wherever letters and digits meet:
/// `StylisticSet1` → `Stylistic Set 1`, `Jis04Forms` → `Jis 04 Forms`.
pub fn humanize_identifier(ident: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for ch in ident.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            flush_word(&mut words, &mut current);
            prev = None;
            continue;
        }

        if let Some(p) = prev {
            let case_break = ch.is_uppercase() && (p.is_lowercase() || p.is_ascii_digit());
            let digit_break = ch.is_ascii_digit() != p.is_ascii_digit();
            if case_break || digit_break {
                flush_word(&mut words, &mut current);
            }
        }

        current.push(ch);
        prev = Some(ch);
    }
    flush_word(&mut words, &mut current);

    title_case(&words.join(" "))
}

/// Capitalises the first letter of every space-separated word and lowercases the rest.
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn flush_word(words: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}
