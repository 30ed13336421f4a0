use std::io::Write;

use crossterm::{queue, style};

/// Split a key hint like `"[1-9] buy"` into `(text, is_key)` runs.
///
/// Bracketed text (brackets included) is a key; everything else is a label.
/// An unclosed bracket makes the rest of the string a label.
pub fn hint_segments(item: &str) -> Vec<(&str, bool)> {
    let mut out = Vec::new();
    let mut rest = item;
    while !rest.is_empty() {
        let Some(open) = rest.find('[') else {
            out.push((rest, false));
            break;
        };
        if open > 0 {
            out.push((&rest[..open], false));
        }
        let tail = &rest[open..];
        match tail.find(']') {
            Some(close) => {
                out.push((&tail[..=close], true));
                rest = &tail[close + 1..];
            }
            None => {
                out.push((tail, false));
                break;
            }
        }
    }
    out
}

/// Print a row of key hints: keys bold, labels dim, two spaces apart.
pub fn print_hints<W: Write>(out: &mut W, items: &[&str]) -> anyhow::Result<()> {
    queue!(out, style::Print(" "))?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            queue!(out, style::Print("  "))?;
        }
        for (text, is_key) in hint_segments(item) {
            let attr = if is_key {
                style::Attribute::Bold
            } else {
                style::Attribute::Dim
            };
            queue!(
                out,
                style::SetAttribute(attr),
                style::Print(text),
                style::SetAttribute(style::Attribute::Reset),
            )?;
        }
    }
    Ok(())
}
