use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::window::PrimaryWindow;
use constants::render_settings::POLYLINE_COLOR;

use crate::engine::assets::scene_settings::SceneSettings;
use crate::tools::drag::VertexDrag;
use crate::tools::picker::{cursor_ray, onto_annotation_plane, plane_hit};
use crate::tools::tool_manager::{ToolManager, ToolType};

#[derive(Component)]
pub struct AnnotationLine;

/// The polyline being drawn: its vertices in click order, the entity and
/// mesh rendering them, and the draw range covering the vertices placed so
/// far.
#[derive(Resource, Default)]
pub struct LineSession {
    points: Vec<Vec3>,
    entity: Option<Entity>,
    mesh: Option<Handle<Mesh>>,
    draw_range: usize,
}

impl LineSession {
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn entity(&self) -> Option<Entity> {
        self.entity
    }

    pub fn mesh(&self) -> Option<&Handle<Mesh>> {
        self.mesh.as_ref()
    }

    pub fn draw_range(&self) -> usize {
        self.draw_range
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append a clicked point and extend the draw range over it.
    pub fn extend(&mut self, point: Vec3) {
        self.points.push(point);
        self.draw_range = self.points.len();
    }

    pub fn attach(&mut self, entity: Entity, mesh: Handle<Mesh>) {
        self.entity = Some(entity);
        self.mesh = Some(mesh);
    }

    /// Detach for save: the points come back as the saved record while the
    /// renderable stays in the scene untouched.
    pub fn detach_saved(&mut self) -> (Vec<Vec3>, Option<Entity>) {
        self.mesh = None;
        self.draw_range = 0;
        (std::mem::take(&mut self.points), self.entity.take())
    }

    /// Clear for delete: the entity and mesh come back for despawn and
    /// disposal.
    pub fn clear_all(&mut self) -> (Option<Entity>, Option<Handle<Mesh>>) {
        self.points.clear();
        self.draw_range = 0;
        (self.entity.take(), self.mesh.take())
    }
}

/// Line-strip mesh over the points inside the draw range.
pub fn build_line_mesh(points: &[Vec3], draw_range: usize) -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::default());
    write_line_positions(&mut mesh, points, draw_range);
    mesh
}

/// Rewrite the position buffer from the vertex sequence. Replacing the
/// attribute marks the asset modified, which queues it for re-upload.
pub fn write_line_positions(mesh: &mut Mesh, points: &[Vec3], draw_range: usize) {
    let covered = draw_range.min(points.len());
    let positions: Vec<[f32; 3]> = points[..covered].iter().map(|p| p.to_array()).collect();
    let normals: Vec<[f32; 3]> = (0..covered).map(|_| [0.0, 1.0, 0.0]).collect();
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
}

/// Left click in line mode appends a point to the growing polyline,
/// creating the buffer (and its entity) on the first click. Suppressed
/// while a vertex is grabbed.
pub fn line_draw_system(
    mut commands: Commands,
    mut session: ResMut<LineSession>,
    tool_manager: Res<ToolManager>,
    drag: Res<VertexDrag>,
    settings: Res<SceneSettings>,
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&GlobalTransform, &Camera), With<Camera3d>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !tool_manager.is_tool_active(ToolType::Line) {
        return;
    }
    if drag.is_grabbed() {
        return;
    }
    if !mouse.just_pressed(MouseButton::Left) {
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
    let Some(hit) = plane_hit(&ray, settings.plane_height) else {
        return;
    };
    let point = onto_annotation_plane(hit);

    session.extend(point);
    match session.mesh().cloned() {
        None => {
            // First point: create the buffer with a single vertex.
            let handle = meshes.add(build_line_mesh(session.points(), session.draw_range()));
            let entity = commands
                .spawn((
                    Mesh3d(handle.clone()),
                    MeshMaterial3d(materials.add(StandardMaterial {
                        base_color: POLYLINE_COLOR,
                        unlit: true,
                        ..default()
                    })),
                    AnnotationLine,
                ))
                .id();
            session.attach(entity, handle);
            info!("Started polyline at ({:.2}, {:.2})", point.x, point.z);
        }
        Some(handle) => {
            let Some(mesh) = meshes.get_mut(&handle) else {
                return;
            };
            write_line_positions(mesh, session.points(), session.draw_range());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::render_settings::ANNOTATION_PLANE_HEIGHT;

    fn plane_point(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, ANNOTATION_PLANE_HEIGHT, z)
    }

    #[test]
    fn points_accumulate_in_click_order() {
        let mut session = LineSession::default();
        let clicks = [
            plane_point(0.0, 0.0),
            plane_point(1.0, 1.0),
            plane_point(2.0, 0.0),
        ];
        for p in clicks {
            session.extend(p);
        }

        assert_eq!(session.points(), &clicks);
        assert_eq!(
            session.draw_range(),
            3,
            "draw range covers every vertex placed so far"
        );
    }

    #[test]
    fn mesh_buffer_mirrors_the_sequence() {
        let mut session = LineSession::default();
        session.extend(plane_point(0.0, 0.0));
        session.extend(plane_point(1.0, 1.0));

        let mesh = build_line_mesh(session.points(), session.draw_range());
        let positions = mesh
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|a| a.as_float3())
            .expect("line mesh carries positions");
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0], [0.0, ANNOTATION_PLANE_HEIGHT, 0.0]);
        assert_eq!(positions[1], [1.0, ANNOTATION_PLANE_HEIGHT, 1.0]);
    }

    #[test]
    fn save_detaches_points_but_not_the_renderable() {
        let mut world = World::new();
        let mut session = LineSession::default();
        session.extend(plane_point(0.0, 0.0));
        session.extend(plane_point(1.0, 1.0));

        let entity = world.spawn_empty().id();
        let mut meshes = Assets::<Mesh>::default();
        let handle = meshes.add(build_line_mesh(session.points(), session.draw_range()));
        session.attach(entity, handle);

        let (points, detached) = session.detach_saved();
        assert_eq!(points.len(), 2);
        assert_eq!(detached, Some(entity));
        assert!(session.is_empty());
        assert_eq!(
            meshes.iter().count(),
            1,
            "saving must not dispose the line buffer"
        );
    }
}
