use std::collections::HashMap;
use std::fmt;

/// HTTP request methods.
///
/// The set is closed: anything else on the request line is rejected by the
/// parser. Only GET is served; the rest are answered with 400 Bad Request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// DELETE - Delete a resource
    DELETE,
    /// PATCH - Partial modification of a resource
    PATCH,
}

/// Represents a parsed HTTP request head.
///
/// `method`, `target` and `version` are always present and non-empty; the
/// parser never hands out a partially populated request.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The raw request target, still percent-encoded (e.g. "/my%20file.txt")
    pub target: String,
    /// HTTP version as sent by the client (typically "HTTP/1.1")
    pub version: String,
    /// Request headers. Keys are kept as received; the last duplicate wins.
    pub headers: HashMap<String, String>,
    /// The request line exactly as received
    pub request_line: String,
    /// Never populated: request bodies are not read
    pub body: Option<String>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    target: Option<String>,
    version: Option<String>,
    headers: HashMap<String, String>,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// # Arguments
    ///
    /// * `s` - String representation of the method (case-sensitive)
    ///
    /// # Returns
    ///
    /// `Some(Method)` if the string matches a known method, `None` otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// # use lantern::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "HEAD" => Some(Method::HEAD),
            "DELETE" => Some(Method::DELETE),
            "PATCH" => Some(Method::PATCH),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::HEAD => "HEAD",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            target: None,
            version: None,
            headers: HashMap::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Builds the request, synthesising the request line from its parts.
    pub fn build(self) -> Result<Request, &'static str> {
        let method = self.method.ok_or("method missing")?;
        let target = self.target.filter(|t| !t.is_empty()).ok_or("target missing")?;
        let version = self.version.unwrap_or_else(|| "HTTP/1.1".to_string());
        if version.is_empty() {
            return Err("version missing");
        }

        Ok(Request {
            request_line: format!("{} {} {}", method, target, version),
            method,
            target,
            version,
            headers: self.headers,
            body: None,
        })
    }
}

impl Request {
    /// Retrieves a header value by its exact (case-sensitive) name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(key)
            .map(|v| v.as_str())
    }
}
