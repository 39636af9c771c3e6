//! Scene plumbing around the annotation tools: configuration, camera
//! navigation, and the static scene content (reference plane, point cloud).

/// Scene settings asset loading.
pub mod assets;

/// Orbit camera state and controller.
pub mod camera;

/// Static scene content.
pub mod scene;
