//! Data model module
//!
//! Request descriptors and call outcomes exchanged with feature code

pub mod request;
pub mod response;

pub use request::{ApiRequest, PartData, RequestBody, UploadPart};
pub use response::{ApiFailure, ApiSuccess, CallResult, FailureKind};
