use encoding_rs::{CoderResult, Decoder};

/// Append one token's bytes to `out`. The decoder keeps partial UTF-8
/// sequences between calls, so tokens that split a character come out whole.
pub fn decode_token_into(decoder: &mut Decoder, bytes: &[u8], out: &mut String) {
    let mut input = bytes;
    loop {
        let room = decoder
            .max_utf8_buffer_length(input.len())
            .unwrap_or(input.len() * 3 + 4);
        out.reserve(room);
        let (result, read, _) = decoder.decode_to_string(input, out, false);
        input = &input[read..];
        match result {
            CoderResult::InputEmpty => return,
            CoderResult::OutputFull => continue,
        }
    }
}

/// Cut `text` at the earliest occurrence of any stop sequence.
/// Returns the byte offset of the cut, if one was found.
pub fn stop_offset<S: AsRef<str>>(text: &str, stop: &[S]) -> Option<usize> {
    stop.iter()
        .map(AsRef::as_ref)
        .filter(|s| !s.is_empty())
        .filter_map(|s| text.find(s))
        .min()
}

pub fn truncate_at_stop<S: AsRef<str>>(text: &str, stop: &[S]) -> String {
    match stop_offset(text, stop) {
        Some(i) => text[..i].to_string(),
        None => text.to_string(),
    }
}

/// Final shape of a prompt function's answer. Stops are cut again after
/// lowercasing, since case folding can turn text into a stop sequence.
pub fn normalize_output<S: AsRef<str>>(text: &str, stop: &[S]) -> String {
    let lowered = truncate_at_stop(text, stop).to_lowercase();
    truncate_at_stop(&lowered, stop).trim().to_string()
}
