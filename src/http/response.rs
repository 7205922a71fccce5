use indexmap::IndexMap;

/// Protocol written on every status line.
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// HTTP status codes the server answers with.
///
/// - `Ok` (200): File or internal resource served
/// - `BadRequest` (400): Malformed request or unsupported method
/// - `Unauthorized` (401): File exists but cannot be read
/// - `NotFound` (404): Nothing at the requested path
/// - `InternalServerError` (500): Any other failure while opening the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 401 Unauthorized
    Unauthorized,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use lantern::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use lantern::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::Unauthorized.reason_phrase(), "Unauthorized");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    /// Name of the bundled error page for this status, if there is one.
    pub fn error_page(&self) -> Option<&'static str> {
        match self {
            StatusCode::Ok => None,
            StatusCode::BadRequest => Some("/error_pages/400.html"),
            StatusCode::Unauthorized => Some("/error_pages/401.html"),
            StatusCode::NotFound => Some("/error_pages/404.html"),
            StatusCode::InternalServerError => Some("/error_pages/500.html"),
        }
    }
}

/// A response head: status line plus headers.
///
/// Bodies are never held here; they are streamed straight from the file or
/// internal resource after the head is written. Headers keep the order they
/// were first inserted in.
#[derive(Debug, Clone)]
pub struct Response {
    /// Protocol version for the status line
    pub version: String,
    /// The HTTP status code
    pub status: StatusCode,
    /// HTTP headers in insertion order
    pub headers: IndexMap<String, String>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use lantern::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Length", "2")
///     .header("Content-Type", "text/html")
///     .build();
/// assert_eq!(response.header("Content-Type"), Some("text/html"));
/// ```
pub struct ResponseBuilder {
    version: String,
    status: StatusCode,
    headers: IndexMap<String, String>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: HTTP_VERSION.to_string(),
            status,
            headers: IndexMap::new(),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Response {
        Response {
            version: self.version,
            status: self.status,
            headers: self.headers,
        }
    }
}

impl Response {
    /// An `HTTP/1.1` response with no headers yet.
    pub fn new(status: StatusCode) -> Self {
        ResponseBuilder::new(status).build()
    }

    /// Adds or replaces a header. A replaced header keeps its position.
    pub fn insert_header(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.headers.insert(key.into(), value.into())
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// Sets `Content-Length` and `Content-Type`, in that order.
    pub fn set_content(&mut self, length: u64, content_type: impl Into<String>) {
        self.insert_header("Content-Length", length.to_string());
        self.insert_header("Content-Type", content_type);
    }
}
