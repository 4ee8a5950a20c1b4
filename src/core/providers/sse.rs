//! Line-oriented stream parsing shared by the wire clients
//!
//! Upstream bodies arrive as arbitrary byte chunks. `LineBuffer` reassembles
//! them into complete lines; `SseLine` classifies a line of an SSE stream.

/// Buffers partial lines across byte chunks
///
/// Bytes are kept raw until a line is complete, so a multi-byte character
/// split across two chunks decodes intact.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes and return every line completed by them
    ///
    /// Lines are returned without their terminator and trimmed. A trailing
    /// incomplete line stays buffered until more bytes arrive.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let Some(pos) = self.buffer.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let rest = self.buffer.split_off(pos + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        // Drop the final terminator so `split` yields no trailing empty line
        complete[..pos]
            .split(|&b| b == b'\n')
            .map(decode_line)
            .collect()
    }

    /// Drain whatever is left once the body ends
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let rest = decode_line(&rest);
        if rest.is_empty() { None } else { Some(rest) }
    }
}

fn decode_line(line: &[u8]) -> String {
    String::from_utf8_lossy(line).trim().to_string()
}

/// One classified SSE line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// `data:` payload
    Data(&'a str),
    /// `data: [DONE]`
    Done,
    /// `event:` name
    Event(&'a str),
    /// Blank line, comment, or a field we do not use
    Ignored,
}

impl<'a> SseLine<'a> {
    pub fn parse(line: &'a str) -> Self {
        if line.is_empty() || line.starts_with(':') {
            return SseLine::Ignored;
        }

        let Some((field, value)) = line.split_once(':') else {
            return SseLine::Ignored;
        };
        let value = value.trim_start();

        match field {
            "data" if value.trim() == "[DONE]" => SseLine::Done,
            "data" => SseLine::Data(value),
            "event" => SseLine::Event(value),
            _ => SseLine::Ignored,
        }
    }
}

/// Extract `error.message` (or a bare `message`) from an upstream error body
pub fn error_message_from_body(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let message = json
            .get("error")
            .and_then(|e| match e {
                serde_json::Value::String(s) => Some(s.clone()),
                other => other
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string),
            })
            .or_else(|| {
                json.get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            });
        if let Some(message) = message {
            return message;
        }
    }
    trimmed.to_string()
}
