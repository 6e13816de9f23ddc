use std::borrow::Cow;

/// Decodes HTML character references (`&lt;`, `&gt;`, `&amp;`, `&quot;`, `&#39;`, `&nbsp;`, and
/// the rest of the HTML named set) into Unicode.
///
/// Decoding repeats until the text stops changing so that double-escaped input pasted from a
/// web page (`&amp;lt;svg&amp;gt;`) ends up as real markup, and so that decoding already-decoded
/// text is a no-op. A character reference is always longer than what it decodes to, so every
/// productive round shortens the text and the loop ends.
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    // Fast path: nothing to decode.
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut current = input.to_string();
    loop {
        let next = htmlize::unescape(&current).into_owned();
        if next.len() >= current.len() {
            break;
        }
        current = next;
    }

    if current == input {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(current)
    }
}

/// Returns `true` when `input` contains an entity-escaped tag such as `&lt;svg`.
pub fn contains_escaped_tag(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    let mut rest = lower.as_str();
    while let Some(i) = rest.find("&lt;") {
        rest = &rest[i + "&lt;".len()..];
        let next = rest.trim_start_matches('/');
        if next.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '!') {
            return true;
        }
    }
    false
}
