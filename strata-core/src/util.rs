use std::fmt::Write;

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Comma separated `name = value` list, used when logging keys and projections.
pub fn printable_pairs<'a, N: AsRef<str> + 'a>(
    pairs: impl IntoIterator<Item = (N, &'a crate::Value)>,
) -> String {
    let mut out = String::new();
    separated_by(
        &mut out,
        pairs,
        |out, (name, value)| {
            let _ = write!(out, "{} = {}", name.as_ref(), value);
        },
        ", ",
    );
    out
}

/// Shortens long text for error and log messages.
pub fn truncate_long(text: &str) -> String {
    const MAX: usize = 97;
    match text.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", text[..end].trim_end()),
        None => text.to_owned(),
    }
}
