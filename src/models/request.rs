//! Request descriptor
//!
//! Everything the client needs to perform one logical call, created
//! per call by feature code and consumed by the pipeline

use reqwest::Method;
use std::time::Duration;

/// Body of an outgoing request
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// No body (GET/DELETE)
    Empty,
    /// Structured JSON payload; runs through payload validation before send
    Json(serde_json::Value),
    /// Multipart form payload for file uploads; bypasses payload validation
    Multipart(Vec<UploadPart>),
}

/// One part of a multipart upload
#[derive(Debug, Clone)]
pub struct UploadPart {
    pub name: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub data: PartData,
}

/// Payload of a multipart part
#[derive(Debug, Clone)]
pub enum PartData {
    Text(String),
    Bytes(Vec<u8>),
}

impl UploadPart {
    /// Plain text form field
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_name: None,
            mime_type: None,
            data: PartData::Text(value.into()),
        }
    }

    /// File form field with raw bytes
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: Some(file_name.into()),
            mime_type: Some(mime_type.into()),
            data: PartData::Bytes(data),
        }
    }
}

/// Descriptor for one logical API call
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Path relative to the configured base URL, e.g. `/tourpackage/`
    pub endpoint: String,
    pub method: Method,
    /// Extra headers merged over the fixed hardening set
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    /// Per-call timeout override; None uses the configured default
    pub timeout: Option<Duration>,
    /// Total send-attempt budget override; None uses the configured default
    pub retries: Option<u32>,
    /// Skip auth prep entirely (login, registration, public listings)
    pub skip_auth: bool,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            headers: Vec::new(),
            body: RequestBody::Empty,
            timeout: None,
            retries: None,
            skip_auth: false,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PATCH, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    /// Attach a JSON body
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Attach a multipart body
    pub fn multipart(mut self, parts: Vec<UploadPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    /// Add an extra header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the timeout for this call
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the send-attempt budget for this call
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Perform the call without attaching credentials
    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    /// Whether the body is a multipart upload
    pub fn is_upload(&self) -> bool {
        matches!(self.body, RequestBody::Multipart(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_produces_descriptor() {
        let request = ApiRequest::post("/tour-booking/")
            .json(serde_json::json!({"number_of_passengers": 4}))
            .retries(2)
            .timeout(Duration::from_secs(5))
            .header("X-Debug", "1");

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.endpoint, "/tour-booking/");
        assert_eq!(request.retries, Some(2));
        assert_eq!(request.timeout, Some(Duration::from_secs(5)));
        assert!(!request.skip_auth);
        assert!(matches!(request.body, RequestBody::Json(_)));
        assert_eq!(request.headers.len(), 1);
    }

    #[test]
    fn test_upload_detection() {
        let upload = ApiRequest::post("/reports/trip_report/")
            .multipart(vec![UploadPart::file("file", "report.pdf", "application/pdf", vec![1, 2])]);
        assert!(upload.is_upload());
        assert!(!ApiRequest::get("/tourpackage/").is_upload());
    }
}
