use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::render_settings::REFERENCE_PLANE_SIZE;
use serde::{Deserialize, Serialize};

use crate::engine::camera::ViewportCamera;
use crate::engine::scene::floor::spawn_reference_plane;
use crate::engine::scene::point_cloud::PointCloudState;

const SETTINGS_PATH: &str = "annotator.settings.json";

/// Scene configuration loaded from a JSON settings asset: where the point
/// cloud lives and how the reference plane is laid out. Defaults cover a
/// missing or unreadable file.
#[derive(Resource, Debug, Clone, Serialize, Deserialize, Asset, TypePath)]
pub struct SceneSettings {
    #[serde(default)]
    pub point_cloud_path: Option<String>,
    #[serde(default = "default_plane_size")]
    pub plane_size: f32,
    #[serde(default)]
    pub plane_height: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            point_cloud_path: None,
            plane_size: default_plane_size(),
            plane_height: 0.0,
        }
    }
}

fn default_plane_size() -> f32 {
    REFERENCE_PLANE_SIZE
}

#[derive(Resource, Default)]
pub struct SettingsLoader {
    handle: Option<Handle<SceneSettings>>,
    resolved: bool,
}

/// Waits for the settings asset, then initialises the scene once: reference
/// plane, camera framing, and the point-cloud load request. A failed load
/// falls back to defaults instead of stalling the app.
pub fn apply_scene_settings(
    mut commands: Commands,
    mut loader: ResMut<SettingsLoader>,
    mut settings: ResMut<SceneSettings>,
    mut point_cloud: ResMut<PointCloudState>,
    mut viewport_camera: ResMut<ViewportCamera>,
    asset_server: Res<AssetServer>,
    settings_assets: Res<Assets<SceneSettings>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if loader.resolved {
        return;
    }
    let Some(handle) = loader.handle.clone() else {
        loader.handle = Some(asset_server.load(SETTINGS_PATH));
        return;
    };

    if let Some(loaded) = settings_assets.get(&handle) {
        *settings = loaded.clone();
        info!("Loaded scene settings from {}", SETTINGS_PATH);
    } else {
        match asset_server.get_load_state(&handle) {
            Some(LoadState::Failed(_)) => {
                warn!("No readable {}; using default scene settings", SETTINGS_PATH);
            }
            _ => return, // Still loading.
        }
    }
    loader.resolved = true;

    spawn_reference_plane(
        &mut commands,
        &mut meshes,
        &mut materials,
        settings.plane_size,
        settings.plane_height,
    );
    *viewport_camera = ViewportCamera::with_scene(
        Vec3::new(0.0, settings.plane_height, 0.0),
        settings.plane_size,
    );
    point_cloud.request(settings.point_cloud_path.clone());
}
