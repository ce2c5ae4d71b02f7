pub mod request;
pub mod response;

pub use request::{read_request, Incoming, Method, ParseError, Request};
pub use response::{write_response, Response, StatusCode};
