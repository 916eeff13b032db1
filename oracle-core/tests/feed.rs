#[path = "feed/scenarios.rs"]
mod scenarios;
