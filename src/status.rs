//! HTTP status codes the service answers with.
//!
//! ```rust
//! use conduit::{Response, Status};
//!
//! Response::status(Status::NotFound);
//! ```

/// The status codes this service produces.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Ok,                    // 200
    BadRequest,            // 400
    NotFound,              // 404
    MethodNotAllowed,      // 405
    UnprocessableContent,  // 422
    InternalServerError,   // 500
    ServiceUnavailable,    // 503
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Self::Ok                   => 200,
            Self::BadRequest           => 400,
            Self::NotFound             => 404,
            Self::MethodNotAllowed     => 405,
            Self::UnprocessableContent => 422,
            Self::InternalServerError  => 500,
            Self::ServiceUnavailable   => 503,
        }
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        s.code()
    }
}
