//! Persistence: originals, renditions, modification records and crops.
//!
//! Renditions are **content-addressed by request**: the key is the SHA-256
//! digest of the normalized modifier ([`modifier_digest`]), so two requests
//! that normalize to the same modifier always resolve to the same stored
//! file, and a change to any encoding-relevant field produces a new key.
//!
//! Two implementations ship:
//!
//! - [`MemoryStore`] — everything behind mutexes, for tests and embedding.
//! - [`FileStore`] — one directory per image under a root:
//!   `<root>/<id>/original.<ext>` for the source file,
//!   `<root>/<id>/<digest>.<ext>` for renditions, plus small JSON manifests
//!   (`modifications.json`, `crops.json`) for the records. Rendition and
//!   manifest writes go to a temp file first and are committed with a
//!   rename, so readers never observe a half-written file.

use crate::crop::Crop;
use crate::geometry::Size;
use crate::image_type::ImageType;
use crate::modifier::ImageModifier;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Version of the per-image manifest format. Bump to invalidate all
/// existing manifests when the format changes.
const MANIFEST_VERSION: u32 = 1;

const MODIFICATIONS_FILENAME: &str = "modifications.json";
const CROPS_FILENAME: &str = "crops.json";
const ORIGINAL_STEM: &str = "original";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// An image payload together with the format its bytes are encoded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub image_type: ImageType,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(image_type: ImageType, bytes: Vec<u8>) -> Self {
        Self { image_type, bytes }
    }

    pub fn content_length(&self) -> usize {
        self.bytes.len()
    }
}

/// A registered rendition: the modifier a deployment wants pre-associated
/// with one concrete size of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageModification {
    pub image_id: u64,
    /// The concrete rendition size this record is registered for.
    pub size: Size,
    pub modifier: ImageModifier,
}

/// Storage for original files and rendition files.
pub trait ImageStore: Send + Sync {
    fn original(&self, image_id: u64) -> Result<Option<ImageFile>, StoreError>;

    fn save_original(&self, image_id: u64, file: &ImageFile) -> Result<(), StoreError>;

    fn variant(
        &self,
        image_id: u64,
        digest: &str,
        image_type: ImageType,
    ) -> Result<Option<ImageFile>, StoreError>;

    fn save_variant(
        &self,
        image_id: u64,
        digest: &str,
        file: &ImageFile,
    ) -> Result<(), StoreError>;

    /// Delete every stored rendition of an image, keeping the original and
    /// the records.
    fn delete_variants(&self, image_id: u64) -> Result<(), StoreError>;

    /// Delete the image entirely: original, renditions and records.
    fn delete_image(&self, image_id: u64) -> Result<(), StoreError>;
}

/// Storage for registered modification records. Upserts are
/// last-writer-wins per `(image, size)`.
pub trait ModificationStore: Send + Sync {
    fn get(&self, image_id: u64, size: Size) -> Result<Option<ImageModification>, StoreError>;

    fn upsert(&self, modification: ImageModification) -> Result<(), StoreError>;

    fn for_image(&self, image_id: u64) -> Result<Vec<ImageModification>, StoreError>;
}

/// Storage for editor-defined crop rectangles.
pub trait CropStore: Send + Sync {
    fn crops_for_image(&self, image_id: u64) -> Result<Vec<Crop>, StoreError>;

    /// Insert or replace by crop id.
    fn save_crop(&self, crop: Crop) -> Result<(), StoreError>;
}

/// SHA-256 of every encoding-relevant field of a normalized modifier,
/// returned as a hex string. This is the rendition cache key.
pub fn modifier_digest(modifier: &ImageModifier) -> String {
    use crate::dimensions::Dimensions;

    let mut hasher = Sha256::new();
    hasher.update(b"modifier\0");
    match modifier.dimensions {
        Dimensions::Absolute { width, height } => {
            hasher.update(b"abs\0");
            hasher.update(width.to_le_bytes());
            hasher.update(height.to_le_bytes());
        }
        Dimensions::Relative { ratio } => {
            hasher.update(b"rel\0");
            hasher.update(ratio.numerator().to_le_bytes());
            hasher.update(ratio.denominator().to_le_bytes());
        }
    }
    match &modifier.crop {
        Some(crop) => {
            hasher.update(b"\x01");
            hasher.update(crop.rect.origin.x.to_le_bytes());
            hasher.update(crop.rect.origin.y.to_le_bytes());
            hasher.update(crop.rect.size.width.to_le_bytes());
            hasher.update(crop.rect.size.height.to_le_bytes());
        }
        None => hasher.update(b"\x00"),
    }
    match modifier.output {
        Some(t) => {
            hasher.update(b"\x01");
            hasher.update(t.extension().as_bytes());
        }
        None => hasher.update(b"\x00"),
    }
    format!("{:x}", hasher.finalize())
}

// =============================================================================
// In-memory store
// =============================================================================

/// Fully in-memory store implementing every storage trait. Mutex-guarded so
/// it can be shared across threads like the file-backed store.
#[derive(Default)]
pub struct MemoryStore {
    originals: Mutex<HashMap<u64, ImageFile>>,
    variants: Mutex<HashMap<(u64, String), ImageFile>>,
    modifications: Mutex<HashMap<(u64, Size), ImageModification>>,
    crops: Mutex<HashMap<u64, Vec<Crop>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variant_count(&self, image_id: u64) -> usize {
        self.variants
            .lock()
            .unwrap()
            .keys()
            .filter(|(id, _)| *id == image_id)
            .count()
    }
}

impl ImageStore for MemoryStore {
    fn original(&self, image_id: u64) -> Result<Option<ImageFile>, StoreError> {
        Ok(self.originals.lock().unwrap().get(&image_id).cloned())
    }

    fn save_original(&self, image_id: u64, file: &ImageFile) -> Result<(), StoreError> {
        self.originals.lock().unwrap().insert(image_id, file.clone());
        Ok(())
    }

    fn variant(
        &self,
        image_id: u64,
        digest: &str,
        _image_type: ImageType,
    ) -> Result<Option<ImageFile>, StoreError> {
        Ok(self
            .variants
            .lock()
            .unwrap()
            .get(&(image_id, digest.to_string()))
            .cloned())
    }

    fn save_variant(
        &self,
        image_id: u64,
        digest: &str,
        file: &ImageFile,
    ) -> Result<(), StoreError> {
        self.variants
            .lock()
            .unwrap()
            .insert((image_id, digest.to_string()), file.clone());
        Ok(())
    }

    fn delete_variants(&self, image_id: u64) -> Result<(), StoreError> {
        self.variants
            .lock()
            .unwrap()
            .retain(|(id, _), _| *id != image_id);
        Ok(())
    }

    fn delete_image(&self, image_id: u64) -> Result<(), StoreError> {
        self.delete_variants(image_id)?;
        self.originals.lock().unwrap().remove(&image_id);
        self.modifications
            .lock()
            .unwrap()
            .retain(|(id, _), _| *id != image_id);
        self.crops.lock().unwrap().remove(&image_id);
        Ok(())
    }
}

impl ModificationStore for MemoryStore {
    fn get(&self, image_id: u64, size: Size) -> Result<Option<ImageModification>, StoreError> {
        Ok(self
            .modifications
            .lock()
            .unwrap()
            .get(&(image_id, size))
            .cloned())
    }

    fn upsert(&self, modification: ImageModification) -> Result<(), StoreError> {
        self.modifications
            .lock()
            .unwrap()
            .insert((modification.image_id, modification.size), modification);
        Ok(())
    }

    fn for_image(&self, image_id: u64) -> Result<Vec<ImageModification>, StoreError> {
        Ok(self
            .modifications
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.image_id == image_id)
            .cloned()
            .collect())
    }
}

impl CropStore for MemoryStore {
    fn crops_for_image(&self, image_id: u64) -> Result<Vec<Crop>, StoreError> {
        Ok(self
            .crops
            .lock()
            .unwrap()
            .get(&image_id)
            .cloned()
            .unwrap_or_default())
    }

    fn save_crop(&self, crop: Crop) -> Result<(), StoreError> {
        let mut crops = self.crops.lock().unwrap();
        let list = crops.entry(crop.image_id).or_default();
        list.retain(|c| c.id != crop.id);
        list.push(crop);
        Ok(())
    }
}

// =============================================================================
// File-backed store
// =============================================================================

/// Per-image JSON manifest holding the registered modifications, keyed by
/// the rendition size as `"WxH"`.
#[derive(Debug, Serialize, Deserialize)]
struct ModificationManifest {
    version: u32,
    entries: HashMap<String, ImageModifier>,
}

impl ModificationManifest {
    fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from an image directory. Returns an empty manifest if the file
    /// doesn't exist or can't be parsed (version mismatch, corruption).
    fn load(dir: &Path) -> Self {
        let content = match fs::read_to_string(dir.join(MODIFICATIONS_FILENAME)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => return Self::empty(),
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    fn save(&self, dir: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        FileStore::commit_file(&dir.join(MODIFICATIONS_FILENAME), json.as_bytes())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CropManifest {
    version: u32,
    crops: Vec<Crop>,
}

impl CropManifest {
    fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            crops: Vec::new(),
        }
    }

    fn load(dir: &Path) -> Self {
        let content = match fs::read_to_string(dir.join(CROPS_FILENAME)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => return Self::empty(),
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    fn save(&self, dir: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        FileStore::commit_file(&dir.join(CROPS_FILENAME), json.as_bytes())
    }
}

fn size_key(size: Size) -> String {
    format!("{}x{}", size.width, size.height)
}

/// Directory-per-image store rooted at a configured path.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn image_dir(&self, image_id: u64) -> PathBuf {
        self.root.join(image_id.to_string())
    }

    fn read_file(path: &Path, image_type: ImageType) -> Result<Option<ImageFile>, StoreError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(ImageFile::new(image_type, bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a temp file in the same directory, then rename into place.
    fn commit_file(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Find `original.<ext>` in an image directory and recover the format
    /// from the extension.
    fn find_original(&self, image_id: u64) -> Result<Option<(PathBuf, ImageType)>, StoreError> {
        let dir = self.image_dir(image_id);
        let entries = match fs::read_dir(&dir) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let path = entry?.path();
            let stem = path.file_stem().and_then(|s| s.to_str());
            if stem != Some(ORIGINAL_STEM) {
                continue;
            }
            if let Some(image_type) = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(ImageType::for_extension)
            {
                return Ok(Some((path, image_type)));
            }
        }
        Ok(None)
    }
}

impl ImageStore for FileStore {
    fn original(&self, image_id: u64) -> Result<Option<ImageFile>, StoreError> {
        match self.find_original(image_id)? {
            Some((path, image_type)) => Self::read_file(&path, image_type),
            None => Ok(None),
        }
    }

    fn save_original(&self, image_id: u64, file: &ImageFile) -> Result<(), StoreError> {
        let dir = self.image_dir(image_id);
        fs::create_dir_all(&dir)?;
        // A replacement may change format; drop any previous original first.
        if let Some((old, _)) = self.find_original(image_id)? {
            fs::remove_file(old)?;
        }
        let path = dir.join(format!("{ORIGINAL_STEM}.{}", file.image_type.extension()));
        Self::commit_file(&path, &file.bytes)
    }

    fn variant(
        &self,
        image_id: u64,
        digest: &str,
        image_type: ImageType,
    ) -> Result<Option<ImageFile>, StoreError> {
        let path = self
            .image_dir(image_id)
            .join(format!("{digest}.{}", image_type.extension()));
        Self::read_file(&path, image_type)
    }

    fn save_variant(
        &self,
        image_id: u64,
        digest: &str,
        file: &ImageFile,
    ) -> Result<(), StoreError> {
        let dir = self.image_dir(image_id);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{digest}.{}", file.image_type.extension()));
        Self::commit_file(&path, &file.bytes)
    }

    fn delete_variants(&self, image_id: u64) -> Result<(), StoreError> {
        let dir = self.image_dir(image_id);
        let entries = match fs::read_dir(&dir) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let path = entry?.path();
            let stem = path.file_stem().and_then(|s| s.to_str());
            let name = path.file_name().and_then(|s| s.to_str());
            if stem == Some(ORIGINAL_STEM)
                || name == Some(MODIFICATIONS_FILENAME)
                || name == Some(CROPS_FILENAME)
            {
                continue;
            }
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn delete_image(&self, image_id: u64) -> Result<(), StoreError> {
        match fs::remove_dir_all(self.image_dir(image_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl ModificationStore for FileStore {
    fn get(&self, image_id: u64, size: Size) -> Result<Option<ImageModification>, StoreError> {
        let manifest = ModificationManifest::load(&self.image_dir(image_id));
        Ok(manifest
            .entries
            .get(&size_key(size))
            .map(|modifier| ImageModification {
                image_id,
                size,
                modifier: modifier.clone(),
            }))
    }

    fn upsert(&self, modification: ImageModification) -> Result<(), StoreError> {
        let dir = self.image_dir(modification.image_id);
        fs::create_dir_all(&dir)?;
        let mut manifest = ModificationManifest::load(&dir);
        manifest
            .entries
            .insert(size_key(modification.size), modification.modifier);
        manifest.save(&dir)
    }

    fn for_image(&self, image_id: u64) -> Result<Vec<ImageModification>, StoreError> {
        let manifest = ModificationManifest::load(&self.image_dir(image_id));
        let mut out = Vec::new();
        for (key, modifier) in manifest.entries {
            let Some((w, h)) = key.split_once('x') else {
                continue;
            };
            let (Ok(width), Ok(height)) = (w.parse(), h.parse()) else {
                continue;
            };
            out.push(ImageModification {
                image_id,
                size: Size::new(width, height),
                modifier,
            });
        }
        Ok(out)
    }
}

impl CropStore for FileStore {
    fn crops_for_image(&self, image_id: u64) -> Result<Vec<Crop>, StoreError> {
        Ok(CropManifest::load(&self.image_dir(image_id)).crops)
    }

    fn save_crop(&self, crop: Crop) -> Result<(), StoreError> {
        let dir = self.image_dir(crop.image_id);
        fs::create_dir_all(&dir)?;
        let mut manifest = CropManifest::load(&dir);
        manifest.crops.retain(|c| c.id != crop.id);
        manifest.crops.push(crop);
        manifest.save(&dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimensions::Dimensions;
    use crate::geometry::Rect;
    use tempfile::TempDir;

    fn jpeg(bytes: &[u8]) -> ImageFile {
        ImageFile::new(ImageType::Jpeg, bytes.to_vec())
    }

    fn modifier(width: u32, height: u32) -> ImageModifier {
        ImageModifier::new(Dimensions::absolute(width, height))
    }

    // =========================================================================
    // Modifier digest
    // =========================================================================

    #[test]
    fn digest_is_deterministic() {
        let m = modifier(800, 600);
        assert_eq!(modifier_digest(&m), modifier_digest(&m));
        assert_eq!(modifier_digest(&m).len(), 64);
    }

    #[test]
    fn digest_varies_with_every_field() {
        let base = modifier(800, 600);
        let other_size = modifier(400, 300);
        let with_output = ImageModifier {
            output: Some(ImageType::Png),
            ..base.clone()
        };
        let with_crop = ImageModifier {
            crop: Some(Crop {
                id: 1,
                image_id: 1,
                version: 0,
                rect: Rect::from_coords(0, 0, 100, 100),
                ratio: None,
                target_width: 0,
            }),
            ..base.clone()
        };

        let digests = [
            modifier_digest(&base),
            modifier_digest(&other_size),
            modifier_digest(&with_output),
            modifier_digest(&with_crop),
        ];
        for (i, a) in digests.iter().enumerate() {
            for b in &digests[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    // =========================================================================
    // MemoryStore
    // =========================================================================

    #[test]
    fn memory_store_roundtrips_originals_and_variants() {
        let store = MemoryStore::new();
        assert!(store.original(7).unwrap().is_none());

        store.save_original(7, &jpeg(b"orig")).unwrap();
        assert_eq!(store.original(7).unwrap().unwrap().bytes, b"orig");

        store.save_variant(7, "abc", &jpeg(b"variant")).unwrap();
        assert_eq!(
            store.variant(7, "abc", ImageType::Jpeg).unwrap().unwrap().bytes,
            b"variant"
        );
        assert!(store.variant(7, "def", ImageType::Jpeg).unwrap().is_none());
    }

    #[test]
    fn memory_store_delete_variants_keeps_original() {
        let store = MemoryStore::new();
        store.save_original(7, &jpeg(b"orig")).unwrap();
        store.save_variant(7, "abc", &jpeg(b"v")).unwrap();
        store.save_variant(8, "abc", &jpeg(b"other")).unwrap();

        store.delete_variants(7).unwrap();
        assert!(store.variant(7, "abc", ImageType::Jpeg).unwrap().is_none());
        assert!(store.original(7).unwrap().is_some());
        assert!(store.variant(8, "abc", ImageType::Jpeg).unwrap().is_some());
    }

    #[test]
    fn memory_store_delete_image_removes_everything() {
        let store = MemoryStore::new();
        store.save_original(7, &jpeg(b"orig")).unwrap();
        store.save_variant(7, "abc", &jpeg(b"v")).unwrap();
        store
            .upsert(ImageModification {
                image_id: 7,
                size: Size::new(800, 600),
                modifier: modifier(800, 600),
            })
            .unwrap();

        store.delete_image(7).unwrap();
        assert!(store.original(7).unwrap().is_none());
        assert!(store.variant(7, "abc", ImageType::Jpeg).unwrap().is_none());
        assert!(store.get(7, Size::new(800, 600)).unwrap().is_none());
    }

    #[test]
    fn memory_store_upsert_is_last_writer_wins() {
        let store = MemoryStore::new();
        let size = Size::new(800, 600);
        store
            .upsert(ImageModification {
                image_id: 7,
                size,
                modifier: modifier(800, 600),
            })
            .unwrap();
        let with_output = ImageModifier {
            output: Some(ImageType::Png),
            ..modifier(800, 600)
        };
        store
            .upsert(ImageModification {
                image_id: 7,
                size,
                modifier: with_output.clone(),
            })
            .unwrap();

        assert_eq!(store.get(7, size).unwrap().unwrap().modifier, with_output);
        assert_eq!(store.for_image(7).unwrap().len(), 1);
    }

    #[test]
    fn memory_store_save_crop_replaces_by_id() {
        let store = MemoryStore::new();
        let mut crop = Crop {
            id: 1,
            image_id: 7,
            version: 0,
            rect: Rect::from_coords(0, 0, 100, 100),
            ratio: None,
            target_width: 0,
        };
        store.save_crop(crop.clone()).unwrap();
        crop.rect = Rect::from_coords(10, 10, 80, 80);
        store.save_crop(crop.clone()).unwrap();

        let crops = store.crops_for_image(7).unwrap();
        assert_eq!(crops.len(), 1);
        assert_eq!(crops[0].rect, Rect::from_coords(10, 10, 80, 80));
    }

    // =========================================================================
    // FileStore
    // =========================================================================

    #[test]
    fn file_store_roundtrips_originals() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();

        assert!(store.original(3).unwrap().is_none());
        store
            .save_original(3, &ImageFile::new(ImageType::Png, b"png data".to_vec()))
            .unwrap();

        let loaded = store.original(3).unwrap().unwrap();
        assert_eq!(loaded.image_type, ImageType::Png);
        assert_eq!(loaded.bytes, b"png data");
        assert!(tmp.path().join("3").join("original.png").exists());
    }

    #[test]
    fn file_store_replacing_original_drops_the_old_format() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        store
            .save_original(3, &ImageFile::new(ImageType::Png, b"png".to_vec()))
            .unwrap();
        store.save_original(3, &jpeg(b"jpeg")).unwrap();

        assert!(!tmp.path().join("3").join("original.png").exists());
        let loaded = store.original(3).unwrap().unwrap();
        assert_eq!(loaded.image_type, ImageType::Jpeg);
    }

    #[test]
    fn file_store_variant_commit_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        store.save_variant(3, "abc123", &jpeg(b"rendition")).unwrap();

        let dir = tmp.path().join("3");
        let names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["abc123.jpeg".to_string()]);

        let loaded = store.variant(3, "abc123", ImageType::Jpeg).unwrap().unwrap();
        assert_eq!(loaded.bytes, b"rendition");
    }

    #[test]
    fn file_store_delete_variants_keeps_original_and_records() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        store.save_original(3, &jpeg(b"orig")).unwrap();
        store.save_variant(3, "abc", &jpeg(b"v1")).unwrap();
        store.save_variant(3, "def", &jpeg(b"v2")).unwrap();
        store
            .upsert(ImageModification {
                image_id: 3,
                size: Size::new(800, 600),
                modifier: modifier(800, 600),
            })
            .unwrap();

        store.delete_variants(3).unwrap();
        assert!(store.variant(3, "abc", ImageType::Jpeg).unwrap().is_none());
        assert!(store.variant(3, "def", ImageType::Jpeg).unwrap().is_none());
        assert!(store.original(3).unwrap().is_some());
        assert!(store.get(3, Size::new(800, 600)).unwrap().is_some());
    }

    #[test]
    fn file_store_delete_image_removes_the_directory() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        store.save_original(3, &jpeg(b"orig")).unwrap();
        store.delete_image(3).unwrap();
        assert!(!tmp.path().join("3").exists());
        // Deleting again is not an error.
        store.delete_image(3).unwrap();
    }

    #[test]
    fn file_store_modifications_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        {
            let store = FileStore::open(tmp.path()).unwrap();
            store
                .upsert(ImageModification {
                    image_id: 3,
                    size: Size::new(800, 600),
                    modifier: modifier(800, 600),
                })
                .unwrap();
        }
        let store = FileStore::open(tmp.path()).unwrap();
        let loaded = store.get(3, Size::new(800, 600)).unwrap().unwrap();
        assert_eq!(loaded.modifier, modifier(800, 600));
        assert!(store.get(3, Size::new(400, 300)).unwrap().is_none());
    }

    #[test]
    fn file_store_manifest_commit_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        store
            .upsert(ImageModification {
                image_id: 3,
                size: Size::new(800, 600),
                modifier: modifier(800, 600),
            })
            .unwrap();
        store
            .save_crop(Crop {
                id: 1,
                image_id: 3,
                version: 0,
                rect: Rect::from_coords(0, 0, 100, 100),
                ratio: None,
                target_width: 0,
            })
            .unwrap();

        let mut names: Vec<String> = fs::read_dir(tmp.path().join("3"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![CROPS_FILENAME.to_string(), MODIFICATIONS_FILENAME.to_string()]
        );
    }

    #[test]
    fn file_store_corrupt_manifest_loads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        let dir = tmp.path().join("3");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MODIFICATIONS_FILENAME), "not json").unwrap();

        assert!(store.get(3, Size::new(800, 600)).unwrap().is_none());
    }

    #[test]
    fn file_store_crops_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let crop = Crop {
            id: 9,
            image_id: 3,
            version: 0,
            rect: Rect::from_coords(5, 5, 50, 50),
            ratio: None,
            target_width: 0,
        };
        {
            let store = FileStore::open(tmp.path()).unwrap();
            store.save_crop(crop.clone()).unwrap();
        }
        let store = FileStore::open(tmp.path()).unwrap();
        assert_eq!(store.crops_for_image(3).unwrap(), vec![crop]);
    }
}
