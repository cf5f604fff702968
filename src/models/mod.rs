pub mod image;

pub use image::{GenerationRequest, ImageSize};
