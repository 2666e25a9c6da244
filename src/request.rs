//! Request descriptors.
//!
//! The engine never talks to the network; each operation instead exposes a
//! builder that returns a `RequestSpec` describing the fetch the transport
//! layer should perform. Builders are total over valid input and never fail.

use serde::Serialize;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A fetch the caller should perform on the engine's behalf.
///
/// `form` carries form-encoded body parameters; it is empty for GET-style
/// operations, which put their parameters in the URL.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RequestSpec {
    pub url: String,
    pub method: HttpMethod,
    pub form: Vec<(String, String)>,
}

impl RequestSpec {
    pub fn get(url: String) -> Self {
        Self {
            url,
            method: HttpMethod::Get,
            form: Vec::new(),
        }
    }

    pub fn post(url: String, form: Vec<(String, String)>) -> Self {
        Self {
            url,
            method: HttpMethod::Post,
            form,
        }
    }
}
