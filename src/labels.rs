use serde::Serialize;

pub const DEFAULT_WRAP_WIDTH: usize = 10;

/// A category label as the charting library takes it: one line, or two lines
/// given as a two-element array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WrappedLabel {
    Single(String),
    Split([String; 2]),
}

/// Wraps a long label onto two lines.
///
/// Labels of at most `max_len` characters come back unchanged. Longer labels
/// split on the last space at or before character `max_len`, dropping that
/// space; without such a space the label is cut at exactly `max_len`.
pub fn wrap_label(label: &str, max_len: usize) -> WrappedLabel {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= max_len {
        return WrappedLabel::Single(label.to_string());
    }

    let space = chars[..=max_len].iter().rposition(|c| *c == ' ');
    let (head, tail) = match space {
        Some(idx) => (&chars[..idx], &chars[idx + 1..]),
        None => (&chars[..max_len], &chars[max_len..]),
    };

    WrappedLabel::Split([head.iter().collect(), tail.iter().collect()])
}
