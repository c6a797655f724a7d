//! Image transformation: capability-based dispatch over pluggable backends.
//!
//! | Piece | Role |
//! |---|---|
//! | [`params`] | Data structures describing one transformation |
//! | [`backend`] | [`ImageTransformer`] trait + [`Capability`] model |
//! | [`chain`] | [`TransformerChain`]: pick the best transformer per request |
//! | [`raster`] | [`RasterTransformer`]: the pure Rust `image`-crate backend |

pub mod backend;
pub mod chain;
pub mod params;
pub mod raster;

pub use backend::{Capability, ImageTransformer, TransformError};
pub use chain::TransformerChain;
pub use params::{ImageAttributes, ModifyParams, Quality};
pub use raster::RasterTransformer;
