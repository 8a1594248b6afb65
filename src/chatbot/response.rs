//! Splitting answers to fit Discord's message size limit.

/// Discord allows 2000 characters per message; keep one spare.
pub const MAX_CHUNK_CHARS: usize = 1999;

/// Split `text` into consecutive windows of at most `max_chars` characters.
///
/// Splitting is by character count only, never at word boundaries, and the
/// chunks concatenate back to `text` exactly. Empty input yields no chunks.
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}
