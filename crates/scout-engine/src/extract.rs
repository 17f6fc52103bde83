/// Slice from the first `{` to the last `}` inclusive.
///
/// Assumes the text carries exactly one top-level object and no stray braces
/// in the surrounding prose.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// First brace-balanced top-level object, skipping braces inside string
/// literals. Prose braces before the object still start a candidate, so a
/// candidate that closes is returned even if it is not valid JSON.
pub fn balanced_json_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(idx);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let begin = start?;
                    return Some(&text[begin..=idx]);
                }
            }
            _ => {}
        }
    }
    None
}
