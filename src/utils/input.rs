//! Cleanup for text arriving from the terminal (typed or pasted).

/// Normalize pasted text before it reaches an input field: tabs become four
/// spaces, carriage returns become newlines and other control characters
/// are dropped.
pub fn sanitize_text_input(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\t' => sanitized.push_str("    "),
            '\r' => sanitized.push('\n'),
            '\n' => sanitized.push(c),
            _ if !c.is_control() => sanitized.push(c),
            _ => {}
        }
    }

    sanitized
}
