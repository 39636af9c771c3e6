use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::alpha::AlphaMode;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::window::PrimaryWindow;
use constants::render_settings::{
    ANNOTATION_PLANE_HEIGHT, MARKER_LIFT, POLYGON_FILL_COLOR, VERTEX_MARKER_COLOR,
    VERTEX_MARKER_RADIUS,
};

use crate::engine::assets::scene_settings::SceneSettings;
use crate::tools::drag::VertexDrag;
use crate::tools::picker::{cursor_ray, onto_annotation_plane, plane_hit};
use crate::tools::tool_manager::{ToolManager, ToolType};
use crate::tools::vertex_order::insertion_index;

#[derive(Component)]
pub struct PolygonFill;

#[derive(Component)]
pub struct VertexMarker;

/// Shared handles for vertex marker rendering. One sphere mesh and one
/// material back every handle, so despawning markers never strands assets.
#[derive(Resource)]
pub struct MarkerAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

impl MarkerAssets {
    pub fn create(
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
    ) -> Self {
        Self {
            mesh: meshes.add(Sphere::new(VERTEX_MARKER_RADIUS)),
            material: materials.add(StandardMaterial {
                base_color: VERTEX_MARKER_COLOR,
                unlit: true,
                ..default()
            }),
        }
    }
}

/// The polygon being edited: the ordered ring, its index-aligned marker
/// entities, and the fill surface once one exists.
///
/// The ring and the marker list may only change together, so every mutation
/// goes through a method that touches both; nothing outside this type can
/// push to one without the other.
#[derive(Resource, Default)]
pub struct PolygonSession {
    ring: Vec<Vec3>,
    markers: Vec<Entity>,
    fill_entity: Option<Entity>,
    fill_mesh: Option<Handle<Mesh>>,
}

impl PolygonSession {
    pub fn ring(&self) -> &[Vec3] {
        &self.ring
    }

    pub fn markers(&self) -> &[Entity] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn fill_entity(&self) -> Option<Entity> {
        self.fill_entity
    }

    /// Splice a vertex and its marker at the same index in one step.
    pub fn splice_vertex(&mut self, index: usize, point: Vec3, marker: Entity) {
        self.ring.insert(index, point);
        self.markers.insert(index, marker);
    }

    /// Overwrite a vertex in place, returning the marker entity that must
    /// follow it. Out-of-range indices mutate nothing.
    pub fn move_vertex(&mut self, index: usize, point: Vec3) -> Option<Entity> {
        let marker = *self.markers.get(index)?;
        self.ring[index] = point;
        Some(marker)
    }

    /// Rebuild the fill mesh asset from the current ring, removing the
    /// previous mesh from `meshes` before the old handle is dropped. Returns
    /// the handle the fill entity should render, or `None` below the
    /// three-vertex threshold.
    pub fn rebuild_fill_mesh(&mut self, meshes: &mut Assets<Mesh>) -> Option<Handle<Mesh>> {
        if let Some(old) = self.fill_mesh.take() {
            meshes.remove(&old);
        }
        let handle = build_fill_mesh(&self.ring).map(|mesh| meshes.add(mesh));
        self.fill_mesh = handle.clone();
        handle
    }

    pub fn set_fill_entity(&mut self, entity: Entity) {
        self.fill_entity = Some(entity);
    }

    pub fn take_fill_entity(&mut self) -> Option<Entity> {
        self.fill_entity.take()
    }

    /// Detach for save: the ring and the marker entities come back to the
    /// caller, while the fill entity (and its mesh asset) stays in the scene
    /// as the saved overlay.
    pub fn detach_saved(&mut self) -> (Vec<Vec3>, Vec<Entity>, Option<Entity>) {
        self.fill_mesh = None;
        (
            std::mem::take(&mut self.ring),
            std::mem::take(&mut self.markers),
            self.fill_entity.take(),
        )
    }

    /// Clear for delete: everything comes back for despawn and disposal.
    pub fn clear_all(&mut self) -> (Vec<Entity>, Option<Entity>, Option<Handle<Mesh>>) {
        self.ring.clear();
        (
            std::mem::take(&mut self.markers),
            self.fill_entity.take(),
            self.fill_mesh.take(),
        )
    }
}

/// Fan-triangulated planar fill at the annotation height, or `None` below
/// the three-vertex threshold.
pub fn build_fill_mesh(ring: &[Vec3]) -> Option<Mesh> {
    let (vertices, indices) = triangulate_ring(ring)?;

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, vertices);
    let normals: Vec<[f32; 3]> = (0..ring.len()).map(|_| [0.0, 1.0, 0.0]).collect();
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_indices(Indices::U32(indices));
    Some(mesh)
}

fn triangulate_ring(ring: &[Vec3]) -> Option<(Vec<[f32; 3]>, Vec<u32>)> {
    if ring.len() < 3 {
        return None;
    }

    let vertices: Vec<[f32; 3]> = ring
        .iter()
        .map(|p| [p.x, ANNOTATION_PLANE_HEIGHT, p.z])
        .collect();

    // Fan from the first vertex.
    let mut indices = Vec::new();
    for i in 1..(ring.len() - 1) {
        indices.extend_from_slice(&[0, i as u32, (i + 1) as u32]);
    }

    Some((vertices, indices))
}

pub fn spawn_vertex_marker(
    commands: &mut Commands,
    marker_assets: &MarkerAssets,
    point: Vec3,
) -> Entity {
    commands
        .spawn((
            Mesh3d(marker_assets.mesh.clone()),
            MeshMaterial3d(marker_assets.material.clone()),
            Transform::from_translation(point + Vec3::Y * MARKER_LIFT),
            VertexMarker,
        ))
        .id()
}

/// Sync the fill entity with the session after a ring mutation: spawn it at
/// the threshold, swap its mesh on later rebuilds, despawn it when the ring
/// drops below three vertices.
pub fn refresh_fill(
    commands: &mut Commands,
    session: &mut PolygonSession,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    match session.rebuild_fill_mesh(meshes) {
        Some(handle) => match session.fill_entity() {
            Some(entity) => {
                commands.entity(entity).insert(Mesh3d(handle));
            }
            None => {
                let entity = commands
                    .spawn((
                        Mesh3d(handle),
                        MeshMaterial3d(materials.add(StandardMaterial {
                            base_color: POLYGON_FILL_COLOR,
                            alpha_mode: AlphaMode::Blend,
                            unlit: true,
                            double_sided: true,
                            cull_mode: None,
                            ..default()
                        })),
                        PolygonFill,
                    ))
                    .id();
                session.set_fill_entity(entity);
            }
        },
        None => {
            if let Some(entity) = session.take_fill_entity() {
                commands.entity(entity).despawn();
            }
        }
    }
}

/// Left click in polygon mode splices a vertex into the ring (nearest-edge
/// ordering), inserts its marker at the same index, and rebuilds the fill.
/// Suppressed entirely while a vertex is grabbed.
pub fn polygon_draw_system(
    mut commands: Commands,
    mut session: ResMut<PolygonSession>,
    tool_manager: Res<ToolManager>,
    drag: Res<VertexDrag>,
    marker_assets: Res<MarkerAssets>,
    settings: Res<SceneSettings>,
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&GlobalTransform, &Camera), With<Camera3d>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !tool_manager.is_tool_active(ToolType::Polygon) {
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

    let index = insertion_index(session.ring(), point);
    let marker = spawn_vertex_marker(&mut commands, &marker_assets, point);
    session.splice_vertex(index, point, marker);
    info!(
        "Polygon vertex {} spliced at index {} ({:.2}, {:.2})",
        session.len(),
        index,
        point.x,
        point.z
    );

    refresh_fill(&mut commands, &mut session, &mut meshes, &mut materials);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(world: &mut World) -> Entity {
        world.spawn_empty().id()
    }

    fn plane_point(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, ANNOTATION_PLANE_HEIGHT, z)
    }

    #[test]
    fn markers_stay_aligned_through_splices() {
        let mut world = World::new();
        let mut session = PolygonSession::default();

        let clicks = [
            plane_point(0.0, 0.0),
            plane_point(10.0, 0.0),
            plane_point(10.0, 10.0),
            plane_point(5.0, -1.0),
            plane_point(-2.0, 5.0),
        ];
        for point in clicks {
            let index = insertion_index(session.ring(), point);
            let m = marker(&mut world);
            session.splice_vertex(index, point, m);

            assert_eq!(
                session.ring().len(),
                session.markers().len(),
                "ring and marker list must grow together"
            );
        }

        // Moving any vertex reports the marker stored at the same index.
        for i in 0..session.len() {
            let expected = session.markers()[i];
            let reported = session.move_vertex(i, plane_point(i as f32, i as f32));
            assert_eq!(reported, Some(expected));
        }
    }

    #[test]
    fn fill_mesh_appears_only_at_three_vertices() {
        let mut world = World::new();
        let mut meshes = Assets::<Mesh>::default();
        let mut session = PolygonSession::default();

        let m0 = marker(&mut world);
        let m1 = marker(&mut world);
        session.splice_vertex(0, plane_point(0.0, 0.0), m0);
        session.splice_vertex(1, plane_point(10.0, 0.0), m1);
        assert!(session.rebuild_fill_mesh(&mut meshes).is_none());
        assert_eq!(meshes.iter().count(), 0, "no fill below three vertices");

        let m2 = marker(&mut world);
        session.splice_vertex(2, plane_point(5.0, 10.0), m2);
        let first = session.rebuild_fill_mesh(&mut meshes);
        assert!(first.is_some(), "third vertex produces the fill");
        assert_eq!(meshes.iter().count(), 1);

        // Each later rebuild disposes exactly the previous mesh.
        session.move_vertex(0, plane_point(-1.0, -1.0));
        let second = session.rebuild_fill_mesh(&mut meshes);
        assert!(second.is_some());
        assert_ne!(first, second);
        assert_eq!(meshes.iter().count(), 1, "old fill mesh must be disposed");
    }

    #[test]
    fn triangle_scenario_builds_fill_over_clicked_vertices() {
        let ring = [
            plane_point(0.0, 0.0),
            plane_point(10.0, 0.0),
            plane_point(5.0, 10.0),
        ];
        let (vertices, indices) = triangulate_ring(&ring).expect("triangle has a fill");
        assert_eq!(vertices.len(), 3);
        assert_eq!(indices, vec![0, 1, 2]);
        for (vertex, clicked) in vertices.iter().zip(ring.iter()) {
            assert_eq!(vertex[0], clicked.x);
            assert_eq!(vertex[2], clicked.z);
            assert_eq!(vertex[1], ANNOTATION_PLANE_HEIGHT);
        }
    }

    #[test]
    fn fan_triangulation_covers_larger_rings() {
        let ring = [
            plane_point(0.0, 0.0),
            plane_point(10.0, 0.0),
            plane_point(10.0, 10.0),
            plane_point(0.0, 10.0),
        ];
        let (_, indices) = triangulate_ring(&ring).expect("quad has a fill");
        assert_eq!(indices.len(), 6, "a quad fans into two triangles");
    }

    #[test]
    fn detach_for_save_keeps_fill_mesh_alive() {
        let mut world = World::new();
        let mut meshes = Assets::<Mesh>::default();
        let mut session = PolygonSession::default();

        for (i, p) in [
            plane_point(0.0, 0.0),
            plane_point(10.0, 0.0),
            plane_point(5.0, 10.0),
        ]
        .into_iter()
        .enumerate()
        {
            let m = marker(&mut world);
            session.splice_vertex(i, p, m);
        }
        session.rebuild_fill_mesh(&mut meshes);
        session.set_fill_entity(marker(&mut world));

        let (ring, markers, fill) = session.detach_saved();
        assert_eq!(ring.len(), 3);
        assert_eq!(markers.len(), 3);
        assert!(fill.is_some());
        assert!(session.is_empty());
        assert_eq!(
            meshes.iter().count(),
            1,
            "saved fill keeps rendering its mesh"
        );

        // A fresh session rebuild must not touch the saved mesh.
        assert!(session.rebuild_fill_mesh(&mut meshes).is_none());
        assert_eq!(meshes.iter().count(), 1);
    }

    #[test]
    fn clear_for_delete_hands_back_everything() {
        let mut world = World::new();
        let mut meshes = Assets::<Mesh>::default();
        let mut session = PolygonSession::default();

        for (i, p) in [
            plane_point(0.0, 0.0),
            plane_point(10.0, 0.0),
            plane_point(5.0, 10.0),
        ]
        .into_iter()
        .enumerate()
        {
            let m = marker(&mut world);
            session.splice_vertex(i, p, m);
        }
        session.rebuild_fill_mesh(&mut meshes);
        session.set_fill_entity(marker(&mut world));

        let (markers, fill_entity, fill_mesh) = session.clear_all();
        assert_eq!(markers.len(), 3);
        assert!(fill_entity.is_some());
        assert!(fill_mesh.is_some());
        assert!(session.is_empty());
    }
}
