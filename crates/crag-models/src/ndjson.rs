use std::pin::Pin;

use crag_core::CragError;
use futures::{Stream, StreamExt};
use serde_json::Value;

use crate::ByteStream;

/// Decode a newline-delimited JSON byte stream into one value per line.
///
/// Lines may be split across network chunks; bytes are buffered until a
/// newline arrives, so multi-byte characters may also straddle chunks. Blank
/// lines are skipped and a trailing line without a newline is decoded when
/// the stream ends. A line that is not UTF-8 or not valid JSON yields a
/// `Parsing` error and ends the stream.
pub fn ndjson_values(
    mut input: ByteStream,
) -> Pin<Box<dyn Stream<Item = Result<Value, CragError>> + Send>> {
    Box::pin(async_stream::stream! {
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = input.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            buffer.extend_from_slice(&chunk);

            while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                match decode_line(&line) {
                    Some(Ok(value)) => yield Ok(value),
                    Some(Err(e)) => {
                        yield Err(e);
                        return;
                    }
                    None => {}
                }
            }
        }

        match decode_line(&buffer) {
            Some(Ok(value)) => yield Ok(value),
            Some(Err(e)) => yield Err(e),
            None => {}
        }
    })
}

fn decode_line(line: &[u8]) -> Option<Result<Value, CragError>> {
    let text = match std::str::from_utf8(line) {
        Ok(text) => text,
        Err(e) => return Some(Err(CragError::Parsing(format!("NDJSON line is not UTF-8: {e}")))),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(
        serde_json::from_str(trimmed)
            .map_err(|e| CragError::Parsing(format!("invalid NDJSON line '{trimmed}': {e}"))),
    )
}
