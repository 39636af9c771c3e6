use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use constants::coordinate_system::to_scene_frame;
use las::Reader;

#[derive(Component)]
pub struct PointCloud;

/// Pending point-cloud load request. The scene keeps working without points
/// when the file is missing or unreadable.
#[derive(Resource, Default)]
pub struct PointCloudState {
    path: Option<String>,
    attempted: bool,
}

impl PointCloudState {
    pub fn request(&mut self, path: Option<String>) {
        self.path = path;
        self.attempted = false;
    }
}

/// Loads the requested LAS/LAZ file once and spawns it as a point mesh.
pub fn load_point_cloud(
    mut commands: Commands,
    mut state: ResMut<PointCloudState>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if state.attempted {
        return;
    }
    let Some(path) = state.path.clone() else {
        return;
    };
    state.attempted = true;

    match read_las_points(Path::new(&path)) {
        Ok(positions) => {
            info!("Loaded {} points from {}", positions.len(), path);
            commands.spawn((
                Mesh3d(meshes.add(build_point_mesh(positions))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: Color::srgb(0.85, 0.85, 0.85),
                    unlit: true,
                    ..default()
                })),
                PointCloud,
                Name::new("PointCloud"),
            ));
        }
        Err(err) => {
            warn!("Could not load point cloud {}: {}", path, err);
        }
    }
}

/// Create a LAS file reader for point cloud access.
/// Handles both .las and .laz compressed formats.
fn create_reader(file_path: &Path) -> Result<Reader, Box<dyn Error>> {
    let file = File::open(file_path)?;
    let buf_reader = BufReader::new(file);
    Ok(Reader::new(buf_reader)?)
}

/// Read every point, re-axis it from Z-up survey space into the Y-up scene
/// frame, and centre the cloud on the origin.
fn read_las_points(path: &Path) -> Result<Vec<[f32; 3]>, Box<dyn Error>> {
    let mut reader = create_reader(path)?;

    let mut positions = Vec::new();
    for point in reader.points() {
        let point = point?;
        let (x, y, z) = to_scene_frame(point.x, point.y, point.z);
        positions.push([x as f32, y as f32, z as f32]);
    }
    center_points(&mut positions);
    Ok(positions)
}

fn center_points(positions: &mut [[f32; 3]]) {
    if positions.is_empty() {
        return;
    }
    let mut centroid = [0.0f64; 3];
    for p in positions.iter() {
        for axis in 0..3 {
            centroid[axis] += p[axis] as f64;
        }
    }
    let count = positions.len() as f64;
    for p in positions.iter_mut() {
        for axis in 0..3 {
            p[axis] -= (centroid[axis] / count) as f32;
        }
    }
}

fn build_point_mesh(positions: Vec<[f32; 3]>) -> Mesh {
    let count = positions.len();
    let mut mesh = Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    let normals: Vec<[f32; 3]> = (0..count).map(|_| [0.0, 1.0, 0.0]).collect();
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh
}
