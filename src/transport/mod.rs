//! Round-trips to the remote game
//!
//! The game has no API: every interaction is either a page fetch or a form
//! submission, and both answer with a rendered page body. Cookies and
//! authentication are held opaquely by the implementation.

pub mod http;

pub use http::HttpTransport;

use crate::core::error::Result;
use std::future::Future;

/// Query string or form fields, in submission order
pub type Fields<'a> = [(&'a str, String)];

/// Page-level access to the game
///
/// Implementations must fail with `PilotError::Transient` on network or
/// service hiccups. Methods take `&mut self`: a transport belongs to exactly
/// one session and is never driven concurrently.
pub trait Transport {
    /// GET `path` with optional query parameters, returning the page body
    fn fetch(&mut self, path: &str, params: &Fields<'_>)
        -> impl Future<Output = Result<String>> + Send;

    /// POST a url-encoded form to `path`, returning the page body
    fn submit(&mut self, path: &str, form: &Fields<'_>)
        -> impl Future<Output = Result<String>> + Send;
}
