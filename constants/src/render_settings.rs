use bevy::prelude::*;

/// Height of the annotation plane above the scene origin. Every placed or
/// dragged vertex is projected onto this plane regardless of where the pick
/// ray meets the reference surface.
pub const ANNOTATION_PLANE_HEIGHT: f32 = 5.0;

/// Vertex handles sit slightly above the fill so they stay visible from the
/// overhead camera.
pub const MARKER_LIFT: f32 = 0.1;

pub const VERTEX_MARKER_RADIUS: f32 = 3.0;
pub const REFERENCE_PLANE_SIZE: f32 = 500.0;
pub const POLYLINE_COLOR: Color = Color::srgb(0.0, 0.0, 1.0);
pub const VERTEX_MARKER_COLOR: Color = Color::srgb(1.0, 1.0, 0.0);
pub const POLYGON_FILL_COLOR: Color = Color::srgba(0.0, 1.0, 0.0, 0.3);
pub const REFERENCE_PLANE_COLOR: Color = Color::srgb(0.33, 0.33, 0.33);
