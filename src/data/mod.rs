pub mod peak;
pub mod presets;
