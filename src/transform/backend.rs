//! The transformer trait and capability model.
//!
//! A transformer advertises, per action and input format, whether it is
//! [`Capability::Unable`], [`Capability::Possible`] or
//! [`Capability::Preferred`]. The [chain](super::chain) asks every registered
//! transformer and dispatches to the best one; a transformer is never called
//! for work it declared itself unable to do.

use super::params::{ImageAttributes, ModifyParams};
use crate::geometry::Size;
use crate::image_type::ImageType;
use crate::store::ImageFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    /// No registered transformer declared itself able to perform the action.
    #[error("no transformer able to perform {action} for {input}")]
    NoCapableTransformer {
        action: &'static str,
        input: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("transform failed: {0}")]
    Failed(String),
}

/// How well a transformer can perform one action on one input.
///
/// Ordered so that `Unable < Possible < Preferred`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Capability {
    Unable,
    Possible,
    Preferred,
}

/// A pixel-work backend.
///
/// Transformers are registered once at startup and consulted through the
/// chain; implementations must be safe to share across threads.
pub trait ImageTransformer: Send + Sync {
    /// Stable name, used in logs.
    fn name(&self) -> &str;

    /// Registration order. Lower runs earlier when capabilities tie.
    fn order(&self) -> i32;

    fn can_compute_dimensions(&self, image_type: ImageType) -> Capability;

    /// `image_type` is a hint; `None` means the format must be sniffed from
    /// the bytes.
    fn can_read_attributes(&self, image_type: Option<ImageType>) -> Capability;

    fn can_modify(&self, params: &ModifyParams) -> Capability;

    fn compute_dimensions(&self, file: &ImageFile) -> Result<Size, TransformError>;

    fn read_attributes(&self, bytes: &[u8]) -> Result<ImageAttributes, TransformError>;

    fn modify(&self, file: &ImageFile, params: &ModifyParams) -> Result<ImageFile, TransformError>;
}
