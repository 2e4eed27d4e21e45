pub mod allocation;
pub mod classification;
pub mod gain_loss;
pub mod positions;

pub use classification::{AssetCategory, AssetClassifier, KeywordClassifier};
pub use gain_loss::Holding;
