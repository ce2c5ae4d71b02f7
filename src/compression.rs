/// Encoding of the precompressed variants stored next to each logical path.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum CompressionType {
    Gzip,
}

/// The only variant the server looks for.
pub const PRECOMPRESSED: CompressionType = CompressionType::Gzip;

impl CompressionType {
    /// Suffix appended to the request path to find the stored file.
    pub fn suffix(self) -> &'static str {
        match self {
            CompressionType::Gzip => ".gz",
        }
    }

    /// Value sent in `Content-Encoding`.
    pub fn content_encoding(self) -> &'static str {
        match self {
            CompressionType::Gzip => "gzip",
        }
    }
}
