//! Minimal STOMP 1.2 text framing, enough for a subscribe-only client.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame has no command line")]
    MissingCommand,
    #[error("malformed header line '{0}'")]
    MalformedHeader(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StompFrame {
    pub command: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl StompFrame {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn connect(host: &str) -> Self {
        Self::new("CONNECT")
            .header("accept-version", "1.2,1.1,1.0")
            .header("host", host)
            .header("heart-beat", "0,0")
    }

    pub fn subscribe(id: &str, destination: &str) -> Self {
        Self::new("SUBSCRIBE")
            .header("id", id)
            .header("destination", destination)
            .header("ack", "auto")
    }

    pub fn disconnect() -> Self {
        Self::new("DISCONNECT")
    }

    /// First occurrence wins when a header repeats.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn encode(&self) -> String {
        let escape = escapes_headers(&self.command);
        let mut out = String::with_capacity(self.command.len() + self.body.len() + 32);
        out.push_str(&self.command);
        out.push('\n');
        for (name, value) in &self.headers {
            if escape {
                out.push_str(&escape_header(name));
                out.push(':');
                out.push_str(&escape_header(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }
}

/// Splits one WebSocket text message into frames. Heart-beat newlines between
/// frames are skipped.
pub fn decode_frames(text: &str) -> Result<Vec<StompFrame>, FrameError> {
    text.split('\0')
        .map(|chunk| chunk.trim_start_matches(['\r', '\n']))
        .filter(|chunk| !chunk.is_empty())
        .map(decode_frame)
        .collect()
}

fn decode_frame(chunk: &str) -> Result<StompFrame, FrameError> {
    let (head, body) = match chunk.find("\n\n") {
        Some(idx) => (&chunk[..idx], &chunk[idx + 2..]),
        None => match chunk.find("\r\n\r\n") {
            Some(idx) => (&chunk[..idx], &chunk[idx + 4..]),
            None => (chunk, ""),
        },
    };

    let mut lines = head.split('\n').map(|line| line.trim_end_matches('\r'));
    let command = lines
        .next()
        .map(str::trim)
        .filter(|command| !command.is_empty())
        .ok_or(FrameError::MissingCommand)?
        .to_string();

    let unescape = escapes_headers(&command);
    let mut headers = Vec::new();
    for line in lines.filter(|line| !line.is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| FrameError::MalformedHeader(line.to_string()))?;
        if unescape {
            headers.push((unescape_header(name)?, unescape_header(value)?));
        } else {
            headers.push((name.to_string(), value.to_string()));
        }
    }

    Ok(StompFrame {
        command,
        headers,
        body: body.to_string(),
    })
}

// CONNECT and CONNECTED frames carry raw header text.
fn escapes_headers(command: &str) -> bool {
    !matches!(command, "CONNECT" | "CONNECTED")
}

fn escape_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape_header(raw: &str) -> Result<String, FrameError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            _ => return Err(FrameError::MalformedHeader(raw.to_string())),
        }
    }
    Ok(out)
}
