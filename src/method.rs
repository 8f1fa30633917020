//! HTTP method as a typed enum.
//!
//! Only the RFC 9110 methods. Anything else is answered with
//! `405 Method Not Allowed` before routing.

use std::fmt;

/// A known HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Trace   => "TRACE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = ();

    fn try_from(m: &http::Method) -> Result<Self, ()> {
        Ok(match m.as_str() {
            "CONNECT" => Self::Connect,
            "DELETE"  => Self::Delete,
            "GET"     => Self::Get,
            "HEAD"    => Self::Head,
            "OPTIONS" => Self::Options,
            "PATCH"   => Self::Patch,
            "POST"    => Self::Post,
            "PUT"     => Self::Put,
            "TRACE"   => Self::Trace,
            _ => return Err(()),
        })
    }
}
