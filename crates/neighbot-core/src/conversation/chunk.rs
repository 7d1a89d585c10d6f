/// Maximum characters per delivered message.
pub const MESSAGE_CHAR_LIMIT: usize = 2000;

/// Split `text` into consecutive pieces of at most `limit` characters.
///
/// Splits on character boundaries, never inside a code point. Empty input
/// yields no chunks.
pub fn split_chunks(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        if count == limit {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
