/// 標題中（非首尾）保持小寫的虛詞
const SMALL_WORDS: &[&str] = &["của", "và", "trong", "cho", "với"];

pub fn proper_case(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let last = words.len().saturating_sub(1);

    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && i < last && SMALL_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn clean_note(value: &str) -> &str {
    let value = value.trim();
    if value.eq_ignore_ascii_case("nan") {
        ""
    } else {
        value
    }
}

/// 合併獨家備註與 NOTE 欄；兩者皆空時改用一般備註欄
pub fn combine_notes(exclusive_note: &str, note: &str, fallback: &str) -> String {
    match (clean_note(exclusive_note), clean_note(note)) {
        ("", "") => clean_note(fallback).to_string(),
        (a, "") => a.to_string(),
        ("", b) => b.to_string(),
        (a, b) => format!("{} {}", a, b),
    }
}
