/// Reassembles server-sent-event frames from arbitrary byte chunks and
/// yields the raw `data:` payload of each frame.
///
/// Event names, ids, retry hints, and comment lines are ignored; the status
/// protocol only carries JSON in the data field. Payload parsing is the
/// caller's job so a malformed payload can fail that one event without
/// poisoning the frame buffer.
#[derive(Default)]
pub struct FrameParser {
    buffer: String,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut payloads = Vec::new();
        let mut start = 0;
        while let Some((offset, len)) = find_frame_boundary(&self.buffer[start..]) {
            let frame = &self.buffer[start..start + offset];
            if let Some(payload) = extract_data_payload(frame) {
                payloads.push(payload);
            }
            start += offset + len;
        }

        if start > 0 {
            self.buffer.drain(..start);
        }
        payloads
    }

    /// Drop any half-received frame; called when a connection is re-opened.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

/// Position and width of the first blank-line frame separator, accepting
/// both LF and CRLF line endings.
fn find_frame_boundary(text: &str) -> Option<(usize, usize)> {
    let lf = text.find("\n\n").map(|offset| (offset, 2));
    let crlf = text.find("\r\n\r\n").map(|offset| (offset, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if b.0 < a.0 { b } else { a }),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn extract_data_payload(frame: &str) -> Option<String> {
    let mut data_lines: Vec<&str> = Vec::new();
    for line in frame.lines() {
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_frame_yields_payload() {
        let mut parser = FrameParser::new();
        let payloads = parser.process(b"data: {\"state\":\"compiling\"}\n\n");
        assert_eq!(payloads, vec!["{\"state\":\"compiling\"}"]);
    }

    #[test]
    fn test_event_name_and_comments_are_ignored() {
        let mut parser = FrameParser::new();
        let payloads =
            parser.process(b": keepalive\nevent: status\nid: 7\ndata: {\"state\":\"running\"}\n\n");
        assert_eq!(payloads, vec!["{\"state\":\"running\"}"]);

        // A frame with no data field yields nothing.
        assert!(parser.process(b": keepalive\n\n").is_empty());
    }

    #[test]
    fn test_reset_drops_partial_frame() {
        let mut parser = FrameParser::new();
        assert!(parser.process(b"data: {\"state\":\"comp").is_empty());
        parser.reset();
        let payloads = parser.process(b"data: {\"state\":\"running\"}\n\n");
        assert_eq!(payloads, vec!["{\"state\":\"running\"}"]);
    }
}
