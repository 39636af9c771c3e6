//! Interactive annotation tools for the point-cloud scene.
//!
//! Every overlay is drawn on the fixed annotation plane: polylines grow one
//! clicked point at a time, polygons splice each clicked point into their
//! ring by a nearest-edge winding heuristic, and polygon vertices remain
//! draggable afterwards through their sphere handles.
//!
//! Pointer routing is a fixed chain each frame: the drag controller gets the
//! first look at a left press (a handle hit starts a drag and suppresses
//! placement), then the drawing tool active in the [`tool_manager`] may
//! place a point, then drag motion and release are processed. All editing
//! state lives in session resources, so a frame never renders a half-updated
//! ring.

/// Vertex-drag state machine: grab on press, re-project on move, release on
/// pointer up.
pub mod drag;

/// Growing polyline buffer and its draw system.
pub mod line;

/// Pure pointer picking: cursor ray, plane intersection, handle hit tests.
pub mod picker;

/// Polygon editing session: ring, index-aligned markers, fill rebuilds.
pub mod polygon;

/// Active-tool state, editor commands, and the saved-annotation store.
pub mod tool_manager;

/// Annotation command panel (bevy_ui buttons).
pub mod ui;

/// Nearest-edge insertion ordering for polygon vertices.
pub mod vertex_order;
