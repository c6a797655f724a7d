//! # Rendition
//!
//! An embeddable engine for on-demand image renditions: store an original
//! once, then serve any crop / resize / re-encode of it, generated on first
//! request and cached forever after.
//!
//! # Architecture: Resolve, Then Generate
//!
//! Every request travels the same path through [`pipeline::VariantService`]:
//!
//! ```text
//! 1. Normalize   modifier + source size  →  concrete pixels, concrete output
//! 2. Look up     modifier digest         →  stored rendition (hit: done)
//! 3. Fall back   registered modification →  the editorially chosen crop
//! 4. Generate    transformer chain       →  store, then serve
//! ```
//!
//! Renditions are content-addressed by the SHA-256 digest of the normalized
//! request, so equivalent requests (`800x600`, `800x`, the 4:3 ratio of a
//! 4:3 source) converge on one stored file, and generation is single-flight
//! per digest: concurrent first requests transform at most once.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`fraction`] | Exact reduced fractions — aspect ratios and scale factors |
//! | [`geometry`] | `Point`, `Size`, `Rect` and their integer scaling laws |
//! | [`dimensions`] | Requested sizes: wildcard axes, bare ratios, normalization |
//! | [`image_type`] | Known formats, content-type mapping, output-type policy |
//! | [`crop`] | Stored crop rectangles and best-crop grading |
//! | [`modifier`] | The rendition request and its normalization |
//! | [`transform`] | Transformer trait, capability dispatch, the raster backend |
//! | [`store`] | Originals, renditions, records — in memory or on disk |
//! | [`lookup`] | Outcomes of fetching originals from upstream repositories |
//! | [`pipeline`] | `VariantService`: the request-to-bytes resolution path |
//! | [`config`] | `config.toml` loading, validation, and service wiring |
//!
//! # Design Decisions
//!
//! ## Pure-Rust Imaging
//!
//! The default [`transform::RasterTransformer`] uses the `image` crate
//! (Lanczos3 resampling, pure Rust codecs) — no ImageMagick, no system
//! libraries. Deployments that need SVG or PDF rasterization register an
//! extra [`transform::ImageTransformer`]; the capability model routes each
//! request to the best backend without the pipeline knowing which exist.
//!
//! ## Normalization Before Everything
//!
//! A modifier is normalized against the source image exactly once, up front,
//! into a fully concrete form. Every later stage (digests, store keys,
//! transformer params) works only with concrete pixels, which is what makes
//! the caching sound: two requests that mean the same rendition cannot reach
//! the store under different keys.
//!
//! ## Records Over Heuristics
//!
//! The engine never invents a crop. Automatic renditions are plain
//! proportional resizes; anything smarter comes from editor-registered
//! [`store::ImageModification`] records and stored [`crop::Crop`] sets,
//! consulted at resolution time.

pub mod config;
pub mod crop;
pub mod dimensions;
pub mod fraction;
pub mod geometry;
pub mod image_type;
pub mod lookup;
pub mod modifier;
pub mod pipeline;
pub mod store;
pub mod transform;
