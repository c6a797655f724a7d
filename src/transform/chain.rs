//! Capability-based dispatch over the registered transformers.
//!
//! The chain is built once at startup from every transformer the deployment
//! registers, sorted by [`ImageTransformer::order`]. For each request it asks
//! every transformer for its capability and dispatches to the first
//! `Preferred` in order, falling back to the first `Possible`. A transformer
//! that answered `Unable` is never invoked. When nothing can do the work the
//! chain fails with [`TransformError::NoCapableTransformer`]; executor errors
//! pass through unchanged.

use super::backend::{Capability, ImageTransformer, TransformError};
use super::params::{ImageAttributes, ModifyParams};
use crate::geometry::Size;
use crate::image_type::ImageType;
use crate::store::ImageFile;
use tracing::debug;

pub struct TransformerChain {
    transformers: Vec<Box<dyn ImageTransformer>>,
}

impl TransformerChain {
    /// Build the chain. Registration order only matters as a tie-break; the
    /// chain re-sorts by `order()`.
    pub fn new(mut transformers: Vec<Box<dyn ImageTransformer>>) -> Self {
        transformers.sort_by_key(|t| t.order());
        Self { transformers }
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    /// First `Preferred` in order, else first `Possible`.
    fn select(
        &self,
        action: &'static str,
        input: &str,
        capability_of: impl Fn(&dyn ImageTransformer) -> Capability,
    ) -> Result<&dyn ImageTransformer, TransformError> {
        let mut fallback = None;
        for transformer in &self.transformers {
            match capability_of(transformer.as_ref()) {
                Capability::Preferred => {
                    debug!(transformer = transformer.name(), action, "selected preferred transformer");
                    return Ok(transformer.as_ref());
                }
                Capability::Possible if fallback.is_none() => {
                    fallback = Some(transformer.as_ref());
                }
                _ => {}
            }
        }
        match fallback {
            Some(transformer) => {
                debug!(transformer = transformer.name(), action, "selected fallback transformer");
                Ok(transformer)
            }
            None => Err(TransformError::NoCapableTransformer {
                action,
                input: input.to_string(),
            }),
        }
    }

    pub fn compute_dimensions(&self, file: &ImageFile) -> Result<Size, TransformError> {
        let transformer = self.select("compute-dimensions", file.image_type.extension(), |t| {
            t.can_compute_dimensions(file.image_type)
        })?;
        transformer.compute_dimensions(file)
    }

    pub fn read_attributes(
        &self,
        bytes: &[u8],
        hint: Option<ImageType>,
    ) -> Result<ImageAttributes, TransformError> {
        let input = hint.map_or("unknown", ImageType::extension);
        let transformer = self.select("read-attributes", input, |t| t.can_read_attributes(hint))?;
        transformer.read_attributes(bytes)
    }

    pub fn modify(
        &self,
        file: &ImageFile,
        params: &ModifyParams,
    ) -> Result<ImageFile, TransformError> {
        let transformer = self.select("modify", params.source_type.extension(), |t| {
            t.can_modify(params)
        })?;
        transformer.modify(file, params)
    }
}
