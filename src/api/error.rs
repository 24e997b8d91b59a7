use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use std::io::Cursor;

#[derive(Debug, Clone)]
pub enum Error {
    /// Device answered with a non-2xx status. The message carries the
    /// coordinator name, URL and status code.
    HttpStatus(String),
    /// Connection or timeout error while talking to the device.
    Request(String),
    /// Response body was not a JSON object.
    InvalidResponse(String),
    /// No poll has ever succeeded for this coordinator.
    NoDataYet(String),
    /// Configured polling interval cannot drive a poll loop.
    InvalidInterval(String),
    FormatError,
    InternalError,
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        match self {
            Error::NoDataYet(s) => {
                let error = format!("<html><body><h3>503 Service Unavailable</h3>No data fetched from the meter yet: <code>{}</code></body></html>", s);
                Response::build()
                    .status(Status::ServiceUnavailable)
                    .sized_body(error.len(), Cursor::new(error))
                    .header(ContentType::new("text", "html"))
                    .ok()
            }
            Error::HttpStatus(s) | Error::Request(s) | Error::InvalidResponse(s) => {
                let error = format!("<html><body><h3>502 Bad Gateway</h3>Error while talking to the meter: <code>{}</code></body></html>", s);
                Response::build()
                    .status(Status::BadGateway)
                    .sized_body(error.len(), Cursor::new(error))
                    .header(ContentType::new("text", "html"))
                    .ok()
            }
            _ => {
                let error = format!(
                    "<html><body><h3>Unknown exception</h3><code>{:?}</code></body></html>",
                    self
                );
                Response::build()
                    .status(Status::InternalServerError)
                    .sized_body(error.len(), Cursor::new(error))
                    .header(ContentType::new("text", "html"))
                    .ok()
            }
        }
    }
}
