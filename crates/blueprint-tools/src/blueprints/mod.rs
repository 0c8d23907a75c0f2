//! Blueprints shipped with the `blueprint` binary

pub mod feature;
pub mod initialize;

pub use feature::FeatureBlueprint;
pub use initialize::InitializeBlueprint;
