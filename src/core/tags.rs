use crate::models::TagFields;

/// Words shorter than this carry no signal on their own ("rp", "de")
const MIN_WORD_LEN: usize = 3;

/// Whether a creator's tag-bearing fields match one requested phrase
///
/// Tried in order: exact equality against any tag or content label; any
/// word of the phrase longer than two characters contained in the combined
/// text; the whole phrase contained in the combined text.
pub fn matches_tag(fields: &TagFields, phrase: &str) -> bool {
    let phrase = phrase.trim().to_lowercase();
    if phrase.is_empty() {
        return false;
    }

    let labels: Vec<String> = fields
        .tags
        .iter()
        .chain(fields.current_content.iter())
        .chain(fields.recent_content.iter())
        .map(|label| label.trim().to_lowercase())
        .collect();

    if labels.iter().any(|label| *label == phrase) {
        return true;
    }

    let combined = labels.join(" ");

    let any_word = phrase
        .split_whitespace()
        .filter(|word| word.chars().count() >= MIN_WORD_LEN)
        .any(|word| combined.contains(word));

    any_word || combined.contains(&phrase)
}

/// OR across phrases
pub fn matches_any_tag(fields: &TagFields, phrases: &[String]) -> bool {
    phrases.iter().any(|phrase| matches_tag(fields, phrase))
}
