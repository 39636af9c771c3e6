use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::render_settings::{MARKER_LIFT, VERTEX_MARKER_RADIUS};

use crate::engine::assets::scene_settings::SceneSettings;
use crate::tools::picker::{cursor_ray, nearest_marker_hit, onto_annotation_plane, plane_hit};
use crate::tools::polygon::{PolygonSession, VertexMarker, refresh_fill};

/// Which polygon vertex handle the pointer currently holds, if any.
/// While a vertex is grabbed, new-point placement is suppressed in every
/// drawing mode.
#[derive(Resource, Default)]
pub struct VertexDrag {
    grabbed: Option<usize>,
}

impl VertexDrag {
    pub fn grab(&mut self, index: usize) {
        self.grabbed = Some(index);
    }

    pub fn release(&mut self) {
        self.grabbed = None;
    }

    pub fn grabbed(&self) -> Option<usize> {
        self.grabbed
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabbed.is_some()
    }
}

/// Left press over a vertex handle starts a drag. Runs before the placement
/// systems so a click on a handle grabs it instead of placing a new point,
/// whatever the active drawing mode.
pub fn begin_vertex_drag(
    mut drag: ResMut<VertexDrag>,
    session: Res<PolygonSession>,
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&GlobalTransform, &Camera), With<Camera3d>>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    if session.is_empty() {
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor_pos) = window.cursor_position() else {
        return;
    };
    let Ok((cam_xform, camera)) = cameras.single() else {
        return;
    };
    let Some(ray) = cursor_ray(camera, cam_xform, cursor_pos) else {
        return;
    };

    let centers: Vec<Vec3> = session
        .ring()
        .iter()
        .map(|p| *p + Vec3::Y * MARKER_LIFT)
        .collect();
    if let Some((index, _t)) = nearest_marker_hit(&ray, &centers, VERTEX_MARKER_RADIUS) {
        drag.grab(index);
        info!("Grabbed polygon vertex {}", index);
    }
}

/// While a vertex is grabbed, every pointer move re-picks the reference
/// plane and pushes the projected point back into the ring, the marker, and
/// the fill. A pick miss mutates nothing this frame.
pub fn drag_vertex_motion(
    mut commands: Commands,
    drag: Res<VertexDrag>,
    mut session: ResMut<PolygonSession>,
    settings: Res<SceneSettings>,
    mut cursor_moved: EventReader<CursorMoved>,
    cameras: Query<(&GlobalTransform, &Camera), With<Camera3d>>,
    mut marker_transforms: Query<&mut Transform, With<VertexMarker>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(index) = drag.grabbed() else {
        cursor_moved.clear();
        return;
    };
    let Some(cursor_pos) = cursor_moved.read().last().map(|moved| moved.position) else {
        return;
    };
    let Ok((cam_xform, camera)) = cameras.single() else {
        return;
    };

    let Some(ray) = cursor_ray(camera, cam_xform, cursor_pos) else {
        return;
    };
    let Some(hit) = plane_hit(&ray, settings.plane_height) else {
        return;
    };
    let point = onto_annotation_plane(hit);

    let Some(marker) = session.move_vertex(index, point) else {
        return;
    };
    if let Ok(mut transform) = marker_transforms.get_mut(marker) {
        transform.translation = point + Vec3::Y * MARKER_LIFT;
    }
    if session.fill_entity().is_some() {
        refresh_fill(&mut commands, &mut session, &mut meshes, &mut materials);
    }
}

/// Pointer release always drops the grab, whatever happened in between.
pub fn release_vertex_drag(
    mut drag: ResMut<VertexDrag>,
    mouse: Res<ButtonInput<MouseButton>>,
) {
    if mouse.just_released(MouseButton::Left) {
        drag.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::render_settings::ANNOTATION_PLANE_HEIGHT;

    #[test]
    fn grab_and_release_cycle() {
        let mut drag = VertexDrag::default();
        assert!(!drag.is_grabbed());

        drag.grab(2);
        assert_eq!(drag.grabbed(), Some(2));

        drag.release();
        assert!(!drag.is_grabbed());
        assert_eq!(drag.grabbed(), None);
    }

    #[test]
    fn re_projection_does_not_drift() {
        let mut world = World::new();
        let mut session = PolygonSession::default();
        for (i, p) in [
            Vec3::new(0.0, ANNOTATION_PLANE_HEIGHT, 0.0),
            Vec3::new(10.0, ANNOTATION_PLANE_HEIGHT, 0.0),
            Vec3::new(5.0, ANNOTATION_PLANE_HEIGHT, 10.0),
        ]
        .into_iter()
        .enumerate()
        {
            let marker = world.spawn_empty().id();
            session.splice_vertex(i, p, marker);
        }

        // The same picked point applied twice leaves the vertex where the
        // first application put it.
        let target = onto_annotation_plane(Vec3::new(7.0, 0.0, 3.0));
        session.move_vertex(1, target);
        let after_first = session.ring()[1];
        session.move_vertex(1, target);
        assert_eq!(session.ring()[1], after_first);
        assert_eq!(session.ring()[1], target);
    }

    #[test]
    fn out_of_range_grab_mutates_nothing() {
        let mut world = World::new();
        let mut session = PolygonSession::default();
        let marker = world.spawn_empty().id();
        session.splice_vertex(0, Vec3::new(0.0, ANNOTATION_PLANE_HEIGHT, 0.0), marker);

        assert_eq!(session.move_vertex(5, Vec3::ZERO), None);
        assert_eq!(session.ring()[0], Vec3::new(0.0, ANNOTATION_PLANE_HEIGHT, 0.0));
    }
}
