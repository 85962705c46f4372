//! Core modules for a native rendition of an animated 3D landing scene.
//!
//! The star lifecycle, pointer trail, link hit-testing and scroll-driven
//! camera motion all live in a headless, testable library.  Windowing
//! and GPU rendering are intentionally kept at the edges so that the
//! same logic can drive a desktop window or a summary-only run in CI.

pub mod camera;
pub mod input;
pub mod picking;
pub mod render;
pub mod scene;
pub mod stage;
pub mod stars;
pub mod trail;
pub mod world;

pub use camera::{CameraRig, Ray, ScrollMapper};
pub use input::{InputState, PointerButton};
pub use picking::{raycast, LinkRegistry, LinkTarget, Navigator, RayHit};
pub use render::{CameraParams, LightParams, Renderer};
pub use scene::{DecorConfig, LightConfig, LinkConfig, SceneManifest, StarfieldConfig};
pub use stage::LandingStage;
pub use stars::Starfield;
pub use trail::{screen_to_ndc, PointerTrail};
pub use world::{ObjectId, ObjectKind, World, WorldObject};
