//! Results of fetching an original from an upstream repository.
//!
//! The engine doesn't talk HTTP itself; whatever does hands the outcome over
//! as a [`LookupResult`]. A 200 with an unrecognized content type is not a
//! success: there is no way to process bytes of unknown format, so the
//! result degrades to [`LookupStatus::Error`] on construction.

use crate::image_type::ImageType;
use crate::store::ImageFile;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("image not found in the upstream repository")]
    NotFound,
    #[error("access to the upstream image was denied")]
    AccessDenied,
    #[error("upstream lookup failed")]
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStatus {
    Success,
    NotFound,
    AccessDenied,
    Error,
}

impl LookupStatus {
    /// Map an HTTP status code onto a lookup outcome.
    pub fn from_http_status(status: u16) -> LookupStatus {
        match status {
            200 => LookupStatus::Success,
            404 => LookupStatus::NotFound,
            401 | 403 => LookupStatus::AccessDenied,
            _ => LookupStatus::Error,
        }
    }
}

/// The outcome of one upstream fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub status: LookupStatus,
    pub image_type: Option<ImageType>,
    pub content: Vec<u8>,
}

impl LookupResult {
    /// A successful fetch. Degrades to `Error` when the content type doesn't
    /// map to a known format.
    pub fn success(content_type: &str, content: Vec<u8>) -> Self {
        match ImageType::for_content_type(content_type) {
            Some(image_type) => Self {
                status: LookupStatus::Success,
                image_type: Some(image_type),
                content,
            },
            None => Self::failed(LookupStatus::Error),
        }
    }

    pub fn failed(status: LookupStatus) -> Self {
        Self {
            status,
            image_type: None,
            content: Vec::new(),
        }
    }

    /// Build from raw HTTP response parts.
    pub fn from_http(status: u16, content_type: Option<&str>, body: Vec<u8>) -> Self {
        match LookupStatus::from_http_status(status) {
            LookupStatus::Success => match content_type {
                Some(ct) => Self::success(ct, body),
                None => Self::failed(LookupStatus::Error),
            },
            other => Self::failed(other),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == LookupStatus::Success
    }

    /// Convert into the fetched file, or the error the status denotes.
    pub fn into_file(self) -> Result<ImageFile, LookupError> {
        match (self.status, self.image_type) {
            (LookupStatus::Success, Some(image_type)) => {
                Ok(ImageFile::new(image_type, self.content))
            }
            (LookupStatus::NotFound, _) => Err(LookupError::NotFound),
            (LookupStatus::AccessDenied, _) => Err(LookupError::AccessDenied),
            _ => Err(LookupError::Failed),
        }
    }
}
