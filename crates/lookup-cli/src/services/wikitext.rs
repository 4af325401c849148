//! Small wikitext extractors used when printing results.

/// Translation template names on Wiktionary.
const TRANSLATION_TEMPLATES: &[&str] = &["t", "t+", "tt", "tt+", "t-simple"];

/// Level-two heading text, e.g. `English` for `==English==`.
fn level_two_heading(line: &str) -> Option<&str> {
    let line = line.trim_end();
    let inner = line.strip_prefix("==")?.strip_suffix("==")?;
    if inner.starts_with('=') || inner.ends_with('=') {
        return None;
    }
    Some(inner.trim())
}

/// Extract the body of the `==language==` section.
pub fn language_section<'a>(text: &'a str, language: &str) -> Option<&'a str> {
    let mut start = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        match (start, level_two_heading(line)) {
            (None, Some(heading)) if heading == language => start = Some(offset + line.len()),
            (Some(begin), Some(_)) => return Some(text[begin..offset].trim()),
            _ => {}
        }
        offset += line.len();
    }

    start.map(|begin| text[begin..].trim())
}

/// The lead of an article: everything before the first section heading.
pub fn lead_section(text: &str) -> &str {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.starts_with("==") {
            break;
        }
        offset += line.len();
    }
    text[..offset].trim()
}

/// Collect translations into `lang_code` from translation templates, in order of
/// appearance and without duplicates.
pub fn translations(text: &str, lang_code: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            break;
        };
        let body = &after[..close];
        rest = &after[close + 2..];

        let mut params = body.split('|').map(str::trim);
        let (Some(name), Some(code), Some(word)) = (params.next(), params.next(), params.next()) else {
            continue;
        };

        if TRANSLATION_TEMPLATES.contains(&name)
            && code == lang_code
            && !word.is_empty()
            && !found.iter().any(|w| w == word)
        {
            found.push(word.to_string());
        }
    }

    found
}
