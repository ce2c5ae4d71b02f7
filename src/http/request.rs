use std::io::{self, BufRead, Read};

use super::response::{Response, StatusCode};

/// Longest request or header line accepted, terminator excluded.
pub const MAX_LINE: usize = 65536;
/// Most header lines accepted in one request.
pub const MAX_HEADERS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    /// Anything else, kept verbatim for the 501 message.
    Other(String),
}

impl Method {
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            other => Method::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

pub const HTTP_1_0: Version = Version { major: 1, minor: 0 };
pub const HTTP_1_1: Version = Version { major: 1, minor: 1 };

impl Version {
    /// Parses `HTTP/<major>.<minor>`.
    pub fn parse(s: &str) -> Option<Self> {
        let numbers = s.strip_prefix("HTTP/")?;
        let (major, minor) = numbers.split_once('.')?;
        if major.is_empty()
            || minor.is_empty()
            || !major.bytes().all(|b| b.is_ascii_digit())
            || !minor.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Request target exactly as sent, query string included.
    pub target: String,
    pub version: Version,
    pub request_line: String,
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// Case-insensitive header lookup, first occurrence wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the connection stays open after the response.
    pub fn keep_alive(&self) -> bool {
        match self.header("Connection") {
            Some(v) if v.eq_ignore_ascii_case("close") => false,
            Some(v) if v.eq_ignore_ascii_case("keep-alive") => true,
            _ => self.version >= HTTP_1_1,
        }
    }
}

/// Why a request could not be parsed. Each maps to an error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    BadVersion(String),
    BadSyntax(String),
    UnsupportedVersion(String),
    RequestLineTooLong,
    HeaderLineTooLong,
    TooManyHeaders,
}

impl ParseError {
    pub fn into_response(self) -> Response {
        match self {
            ParseError::BadVersion(v) => Response::error(
                StatusCode::BadRequest,
                Some(&format!("Bad request version ('{}')", v)),
            ),
            ParseError::BadSyntax(line) => Response::error(
                StatusCode::BadRequest,
                Some(&format!("Bad request syntax ('{}')", line)),
            ),
            ParseError::UnsupportedVersion(v) => Response::error(
                StatusCode::HttpVersionNotSupported,
                Some(&format!("Invalid HTTP version ({})", v)),
            ),
            ParseError::RequestLineTooLong => Response::error(StatusCode::UriTooLong, None),
            ParseError::HeaderLineTooLong => {
                Response::error(StatusCode::RequestHeaderFieldsTooLarge, Some("Line too long"))
            }
            ParseError::TooManyHeaders => Response::error(
                StatusCode::RequestHeaderFieldsTooLarge,
                Some("Too many headers"),
            ),
        }
    }
}

#[derive(Debug)]
pub enum Incoming {
    Request(Request),
    Malformed(ParseError),
    /// Peer closed the connection, or sent a blank request line.
    Closed,
}

/// Reads one line including its terminator, bounded by `MAX_LINE`.
/// Returns `None` when the line is too long.
fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    reader
        .by_ref()
        .take(MAX_LINE as u64 + 1)
        .read_until(b'\n', &mut buf)?;
    if buf.len() > MAX_LINE {
        return Ok(None);
    }
    // Header bytes are ISO-8859-1
    Ok(Some(buf.iter().map(|&b| b as char).collect()))
}

pub fn read_request<R: BufRead>(reader: &mut R) -> io::Result<Incoming> {
    let raw_line = match read_line(reader)? {
        Some(line) if line.is_empty() => return Ok(Incoming::Closed),
        Some(line) => line,
        None => return Ok(Incoming::Malformed(ParseError::RequestLineTooLong)),
    };

    let request_line = raw_line.trim_end_matches(['\r', '\n']).to_string();
    let words: Vec<&str> = request_line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(Incoming::Closed);
    }

    if words.len() != 3 {
        return Ok(Incoming::Malformed(ParseError::BadSyntax(request_line)));
    }

    let version = match Version::parse(words[2]) {
        Some(v) => v,
        None => return Ok(Incoming::Malformed(ParseError::BadVersion(words[2].to_string()))),
    };
    if version.major >= 2 {
        return Ok(Incoming::Malformed(ParseError::UnsupportedVersion(
            words[2].to_string(),
        )));
    }

    let method = Method::parse(words[0]);
    let target = words[1].to_string();

    let mut headers = Vec::new();
    loop {
        let line = match read_line(reader)? {
            Some(line) => line,
            None => return Ok(Incoming::Malformed(ParseError::HeaderLineTooLong)),
        };
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            break;
        }
        if headers.len() >= MAX_HEADERS {
            return Ok(Incoming::Malformed(ParseError::TooManyHeaders));
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_string(), value.trim().to_string()));
        } else {
            log::debug!("Skipping invalid header line: {}", line);
        }
    }

    Ok(Incoming::Request(Request {
        method,
        target,
        version,
        request_line,
        headers,
    }))
}
