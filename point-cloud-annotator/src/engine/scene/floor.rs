use bevy::prelude::*;
use constants::render_settings::REFERENCE_PLANE_COLOR;

/// The picking surface every annotation is projected from.
#[derive(Component)]
pub struct ReferencePlane;

pub fn spawn_reference_plane(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    size: f32,
    height: f32,
) {
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(size, size))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: REFERENCE_PLANE_COLOR,
            double_sided: true,
            cull_mode: None,
            ..default()
        })),
        Transform::from_translation(Vec3::Y * height),
        ReferencePlane,
        Name::new("ReferencePlane"),
    ));
}
