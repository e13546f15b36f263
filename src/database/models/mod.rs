pub mod asset;
pub mod asset_property;
pub mod asset_type;
pub mod data_type;
pub mod history;
pub mod property;

pub use asset::{Asset, BoundingBox};
pub use asset_property::{AssetProperty, AssetPropertySummary};
pub use asset_type::AssetType;
pub use data_type::DataType;
pub use history::HistoryEntry;
pub use property::Property;
