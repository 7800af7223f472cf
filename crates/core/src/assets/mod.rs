//! Asset classification.

mod asset_type;
mod asset_type_detection;
mod assets_constants;

pub use asset_type::AssetType;
pub use asset_type_detection::{detect_asset_type, resolve_asset_type};
