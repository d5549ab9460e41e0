//! Skills
//!
//! External capabilities the being may exercise: posting to X and
//! generating images. Each skill is gated by an `enabled` flag in the
//! character configuration; disabled skills fail fast without touching
//! the network.

pub mod image_gen;
pub mod x_api;

pub use image_gen::ImageGenClient;
pub use x_api::XApiClient;
