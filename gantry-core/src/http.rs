// Narrow HTTP request/response model
//
// Gantry sits above a host web framework; the transport adapter copies the
// parts of its native request type that the dispatch layer consumes into
// `HttpRequest`, and converts `HttpResponse` back out. Nothing here owns a
// socket.

use crate::Error;
use std::collections::HashMap;

/// Inbound request as seen by the dispatch layer.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// Parameters captured from the URL pattern by the host router
    /// (e.g. an `:id` segment).
    pub path_params: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    /// Uploaded files, keyed by field name. Populated by the transport
    /// adapter for multipart submits.
    pub files: HashMap<String, FormFile>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a path parameter by name
    pub fn param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Get a query parameter by name
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    pub fn is_post(&self) -> bool {
        self.method.eq_ignore_ascii_case("POST")
    }

    /// Parse a urlencoded request body into a field map. This is the
    /// payload handed to form-backed handlers on submit.
    pub fn form_map(&self) -> Result<HashMap<String, String>, Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(&self.body)
            .map_err(|e| Error::BadRequest(format!("Failed to parse form data: {}", e)))?;
        Ok(pairs.into_iter().collect())
    }
}

/// Uploaded file data
#[derive(Debug, Clone)]
pub struct FormFile {
    /// Original filename
    pub filename: String,
    /// Content type (MIME type)
    pub content_type: String,
    /// File size in bytes
    pub size: usize,
    /// File data
    pub data: Vec<u8>,
}

impl FormFile {
    pub fn new(filename: String, content_type: String, data: Vec<u8>) -> Self {
        let size = data.len();
        Self {
            filename,
            content_type,
            size,
            data,
        }
    }

    /// Get file extension
    pub fn extension(&self) -> Option<&str> {
        self.filename.rsplit('.').next()
    }
}

/// Outbound response: rendered fragment body plus a header mapping.
#[derive(Debug, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    /// 200 response carrying a rendered HTML fragment.
    pub fn html(body: impl Into<String>) -> Self {
        let mut response = Self::ok();
        response.body = body.into().into_bytes();
        response
            .headers
            .insert("Content-Type".to_string(), "text/html; charset=utf-8".to_string());
        response
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or("")
    }
}
