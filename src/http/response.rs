use std::io::{self, Write};
use std::time::SystemTime;

pub const SERVER_NAME: &str = concat!("gzcors/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    MovedPermanently,
    NotModified,
    BadRequest,
    NotFound,
    UriTooLong,
    RequestHeaderFieldsTooLarge,
    NotImplemented,
    HttpVersionNotSupported,
}

impl StatusCode {
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::MovedPermanently => 301,
            StatusCode::NotModified => 304,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::UriTooLong => 414,
            StatusCode::RequestHeaderFieldsTooLarge => 431,
            StatusCode::NotImplemented => 501,
            StatusCode::HttpVersionNotSupported => 505,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::UriTooLong => "Request-URI Too Long",
            StatusCode::RequestHeaderFieldsTooLarge => "Request Header Fields Too Large",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::HttpVersionNotSupported => "HTTP Version Not Supported",
        }
    }

    /// Longer description used on error pages.
    pub fn explanation(&self) -> &'static str {
        match self {
            StatusCode::Ok => "Request fulfilled, document follows",
            StatusCode::MovedPermanently => "Object moved permanently -- see URI list",
            StatusCode::NotModified => "Document has not changed since given time",
            StatusCode::BadRequest => "Bad request syntax or unsupported method",
            StatusCode::NotFound => "Nothing matches the given URI",
            StatusCode::UriTooLong => "URI is too long",
            StatusCode::RequestHeaderFieldsTooLarge => {
                "The server refused this request because the request header fields are too large"
            }
            StatusCode::NotImplemented => "Server does not support this operation",
            StatusCode::HttpVersionNotSupported => "Cannot fulfill request",
        }
    }

    /// Statuses that never carry a body.
    pub fn is_bodyless(&self) -> bool {
        matches!(self, StatusCode::NotModified)
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    /// Text after the code on the status line.
    pub reason: String,
    /// Headers in the order they are written.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Close the connection once this response is written.
    pub close: bool,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            reason: status.reason_phrase().to_string(),
            headers: Vec::new(),
            body: Vec::new(),
            close: false,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Case-insensitive header lookup, first occurrence wins.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// HTML error page. `message` replaces the reason phrase on the status
    /// line and defaults to it. The connection is closed afterwards.
    pub fn error(status: StatusCode, message: Option<&str>) -> Self {
        let message = message.unwrap_or_else(|| status.reason_phrase());
        let mut response = Self::new(status).header("Connection", "close");
        response.reason = message.to_string();
        response.close = true;

        if status.is_bodyless() {
            return response;
        }

        let body = format!(
            "<!DOCTYPE HTML>\n\
             <html lang=\"en\">\n    \
             <head>\n        \
             <meta charset=\"utf-8\">\n        \
             <title>Error response</title>\n    \
             </head>\n    \
             <body>\n        \
             <h1>Error response</h1>\n        \
             <p>Error code: {code}</p>\n        \
             <p>Message: {message}.</p>\n        \
             <p>Error code explanation: {code} - {explain}.</p>\n    \
             </body>\n\
             </html>\n",
            code = status.as_u16(),
            message = escape_html(message),
            explain = escape_html(status.explanation()),
        );
        let body = body.into_bytes();
        response
            .header("Content-Type", "text/html;charset=utf-8")
            .header("Content-Length", body.len().to_string())
            .body(body)
    }

    /// Completes the header block: `Server` and `Date` go first, the
    /// wildcard CORS grant goes last. Every response passes through here.
    pub fn finalize(mut self) -> Self {
        let mut headers = vec![
            ("Server".to_string(), SERVER_NAME.to_string()),
            ("Date".to_string(), httpdate::fmt_http_date(SystemTime::now())),
        ];
        headers.append(&mut self.headers);
        headers.push(("Access-Control-Allow-Origin".to_string(), "*".to_string()));
        self.headers = headers;
        self
    }
}

/// Escapes `&`, `<` and `>`.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Writes the status line, headers and, unless `head_only`, the body.
pub fn write_response<W: Write>(writer: &mut W, response: &Response, head_only: bool) -> io::Result<()> {
    let mut head = format!(
        "HTTP/1.1 {} {}\r\n",
        response.status.as_u16(),
        response.reason
    );
    for (key, value) in &response.headers {
        head.push_str(key);
        head.push_str(": ");
        head.push_str(value);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");

    writer.write_all(head.as_bytes())?;
    if !head_only && !response.status.is_bodyless() {
        writer.write_all(&response.body)?;
    }
    writer.flush()
}
