mod client;
mod normalize;
mod provider;
mod types;

pub use provider::{DroneProvider, DEFAULT_BASE_URL};
