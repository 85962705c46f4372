mod native;

pub use native::{CameraParams, LightParams, Renderer};
