#[path = "aggregate/properties.rs"]
mod properties;
