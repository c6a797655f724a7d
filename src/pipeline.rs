//! Rendition resolution: the path from a request to stored bytes.
//!
//! [`VariantService`] owns the stores and the transformer chain and resolves
//! each `(image, modifier)` request in a fixed order:
//!
//! 1. normalize the modifier against the source size
//! 2. resolve the output type (explicit request, else the source format's
//!    preferred output)
//! 3. look the rendition up by its modifier digest
//! 4. on a miss, consult the registered modification for that size; a hit
//!    there carries the editorially chosen crop
//! 5. generate, with per-digest single-flight so concurrent requests for the
//!    same rendition transform at most once
//!
//! Generated files are committed to the store before the in-flight lock is
//! released, so a request that lost the race always finds the winner's file.

use crate::crop::{self, Crop};
use crate::dimensions::{Dimensions, DimensionsError};
use crate::geometry::Size;
use crate::image_type::ImageType;
use crate::lookup::{LookupError, LookupResult};
use crate::modifier::ImageModifier;
use crate::store::{
    CropStore, ImageFile, ImageModification, ImageStore, ModificationStore, StoreError,
    modifier_digest,
};
use crate::transform::{ModifyParams, Quality, TransformError, TransformerChain};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    InvalidDimensions(#[from] DimensionsError),
    #[error("no output type for image {image_id} ({modifier})")]
    UnresolvableOutputType { image_id: u64, modifier: String },
    #[error("image {0} has no stored original")]
    MissingOriginal(u64),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// A known image: its id plus the attributes of the stored original.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef {
    pub id: u64,
    pub size: Size,
    pub image_type: ImageType,
}

/// A fully resolved request: normalized modifier, concrete target, concrete
/// output type, and the digest the rendition is stored under.
struct Resolved {
    modifier: ImageModifier,
    target: Size,
    output: ImageType,
    digest: String,
}

pub struct VariantService {
    store: Arc<dyn ImageStore>,
    modifications: Arc<dyn ModificationStore>,
    crops: Arc<dyn CropStore>,
    chain: Arc<TransformerChain>,
    quality: Quality,
    in_flight: Mutex<HashMap<(u64, String), Arc<Mutex<()>>>>,
}

impl VariantService {
    pub fn new(
        store: Arc<dyn ImageStore>,
        modifications: Arc<dyn ModificationStore>,
        crops: Arc<dyn CropStore>,
        chain: Arc<TransformerChain>,
        quality: Quality,
    ) -> Self {
        Self {
            store,
            modifications,
            crops,
            chain,
            quality,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Normalize and resolve a request. `None` means the request is for the
    /// unmodified original.
    fn resolve(
        &self,
        image: &ImageRef,
        modifier: &ImageModifier,
    ) -> Result<Option<Resolved>, PipelineError> {
        let normalized = modifier.normalize(image.size)?;
        if normalized.is_empty() {
            return Ok(None);
        }
        let target = match normalized.resolved_size() {
            Some(size) => size,
            None => {
                return Err(DimensionsError::DegenerateSource {
                    source_size: image.size,
                    requested: normalized.dimensions.to_string(),
                }
                .into());
            }
        };
        let output = normalized
            .output
            .or_else(|| image.image_type.preferred_output_type())
            .ok_or_else(|| PipelineError::UnresolvableOutputType {
                image_id: image.id,
                modifier: normalized.to_string(),
            })?;
        let modifier = ImageModifier {
            output: Some(output),
            ..normalized
        };
        let digest = modifier_digest(&modifier);
        Ok(Some(Resolved {
            modifier,
            target,
            output,
            digest,
        }))
    }

    /// Fetch the rendition for one request, generating and storing it on a
    /// first miss. An empty modifier returns the stored original.
    pub fn fetch_image_file(
        &self,
        image: &ImageRef,
        modifier: &ImageModifier,
    ) -> Result<ImageFile, PipelineError> {
        debug!(image_id = image.id, %modifier, "fetch image file");
        let Some(requested) = self.resolve(image, modifier)? else {
            return self.original(image.id);
        };

        if let Some(file) = self
            .store
            .variant(image.id, &requested.digest, requested.output)?
        {
            return Ok(file);
        }

        // A registered modification for this size carries the editorially
        // chosen crop; prefer it over the bare request. An explicit output
        // type on the request still wins.
        let resolved = match self.modifications.get(image.id, requested.target)? {
            Some(record) => {
                debug!(
                    image_id = image.id,
                    size = %requested.target,
                    "using registered modification"
                );
                let mut registered = record.modifier.clone();
                // A crop-only record pins no size of its own; the size it was
                // registered under is the intended rendition size.
                if registered.dimensions == Dimensions::unconstrained() {
                    registered.dimensions = record.size.into();
                }
                if modifier.output.is_some() {
                    registered.output = modifier.output;
                }
                match self.resolve(image, &registered)? {
                    Some(resolved) => resolved,
                    None => requested,
                }
            }
            None => requested,
        };

        if let Some(file) = self
            .store
            .variant(image.id, &resolved.digest, resolved.output)?
        {
            return Ok(file);
        }

        self.generate(image, resolved)
    }

    /// Generate one rendition under the per-digest in-flight lock.
    fn generate(&self, image: &ImageRef, resolved: Resolved) -> Result<ImageFile, PipelineError> {
        let key = (image.id, resolved.digest.clone());
        let lock = self.flight_lock(&key);
        let result = {
            let _guard = lock.lock().unwrap();
            // The winner of the race stored the file before releasing.
            if let Some(file) = self
                .store
                .variant(image.id, &resolved.digest, resolved.output)?
            {
                Ok(file)
            } else {
                debug!(
                    image_id = image.id,
                    target = %resolved.target,
                    output = %resolved.output,
                    "generating rendition"
                );
                let original = self.original(image.id)?;
                let params = ModifyParams {
                    source_type: original.image_type,
                    crop: resolved.modifier.crop.as_ref().map(|c| c.rect),
                    target: resolved.target,
                    output_type: resolved.output,
                    quality: self.quality,
                };
                let file = self.chain.modify(&original, &params)?;
                self.store.save_variant(image.id, &resolved.digest, &file)?;
                Ok(file)
            }
        };
        self.release_flight(&key, lock);
        result
    }

    fn flight_lock(&self, key: &(u64, String)) -> Arc<Mutex<()>> {
        self.in_flight
            .lock()
            .unwrap()
            .entry(key.clone())
            .or_default()
            .clone()
    }

    fn release_flight(&self, key: &(u64, String), lock: Arc<Mutex<()>>) {
        let mut map = self.in_flight.lock().unwrap();
        // Two references left means nobody else is waiting: the map's and ours.
        if Arc::strong_count(&lock) <= 2 {
            map.remove(key);
        }
    }

    fn original(&self, image_id: u64) -> Result<ImageFile, PipelineError> {
        self.store
            .original(image_id)?
            .ok_or(PipelineError::MissingOriginal(image_id))
    }

    /// Register a modification record under the rendition size `target`
    /// resolves to. The modifier itself is stored untouched, so a crop-only
    /// modifier can be registered for a specific size. Returns the concrete
    /// size. Last writer wins per `(image, size)`.
    pub fn register_modification(
        &self,
        image: &ImageRef,
        target: Dimensions,
        modifier: ImageModifier,
    ) -> Result<Size, PipelineError> {
        let size = target.normalize(image.size)?;
        debug!(image_id = image.id, %size, "register modification");
        self.modifications.upsert(ImageModification {
            image_id: image.id,
            size,
            modifier,
        })?;
        Ok(size)
    }

    /// Store a newly fetched original, invalidating every existing rendition
    /// of the image. Renditions are deleted before the new original lands,
    /// so a crash in between leaves stale renditions gone rather than
    /// serving ones cut from the old source.
    pub fn replace_original(
        &self,
        image_id: u64,
        lookup: LookupResult,
    ) -> Result<ImageRef, PipelineError> {
        let file = lookup.into_file()?;
        let attributes = self
            .chain
            .read_attributes(&file.bytes, Some(file.image_type))?;
        debug!(
            image_id,
            size = %attributes.size,
            image_type = %attributes.image_type,
            "replace original"
        );
        self.store.delete_variants(image_id)?;
        // Trust the bytes over the upstream content-type header.
        let file = ImageFile::new(attributes.image_type, file.bytes);
        self.store.save_original(image_id, &file)?;
        Ok(ImageRef {
            id: image_id,
            size: attributes.size,
            image_type: attributes.image_type,
        })
    }

    /// Inspect raw bytes: detect the format and pixel size.
    pub fn read_attributes(
        &self,
        bytes: &[u8],
    ) -> Result<crate::transform::ImageAttributes, PipelineError> {
        Ok(self.chain.read_attributes(bytes, None)?)
    }

    /// Delete an image's renditions, or the whole image.
    pub fn delete(&self, image_id: u64, variants_only: bool) -> Result<(), PipelineError> {
        debug!(image_id, variants_only, "delete");
        if variants_only {
            self.store.delete_variants(image_id)?;
        } else {
            self.store.delete_image(image_id)?;
        }
        Ok(())
    }

    /// The best stored crop for rendering an image at `size` under crop-set
    /// `version`.
    pub fn best_crop_for(
        &self,
        image_id: u64,
        version: u32,
        size: Size,
    ) -> Result<Option<Crop>, PipelineError> {
        let crops = self.crops.crops_for_image(image_id)?;
        Ok(crop::best_crop_for_size(&crops, version, size).cloned())
    }

    pub fn save_crop(&self, crop: Crop) -> Result<(), PipelineError> {
        Ok(self.crops.save_crop(crop)?)
    }
}
