use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy_common_assets::json::JsonAssetPlugin;

mod engine;
mod tools;

use engine::assets::scene_settings::{SceneSettings, SettingsLoader, apply_scene_settings};
use engine::camera::{ViewportCamera, camera_controller};
use engine::scene::point_cloud::{PointCloudState, load_point_cloud};
use tools::drag::{VertexDrag, begin_vertex_drag, drag_vertex_motion, release_vertex_drag};
use tools::line::{LineSession, line_draw_system};
use tools::polygon::{MarkerAssets, PolygonSession, polygon_draw_system};
use tools::tool_manager::{
    EditorCommand, SavedAnnotations, ToolManager, editor_keyboard_shortcuts,
    handle_editor_commands,
};
use tools::ui::{panel_button_interaction, reflect_active_tool, spawn_annotation_panel};

fn main() {
    create_app().run();
}

fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(JsonAssetPlugin::<SceneSettings>::new(&["settings.json"]))
        .add_event::<EditorCommand>()
        .init_resource::<SettingsLoader>()
        .init_resource::<SceneSettings>()
        .init_resource::<PointCloudState>()
        .init_resource::<ViewportCamera>()
        .init_resource::<ToolManager>()
        .init_resource::<LineSession>()
        .init_resource::<PolygonSession>()
        .init_resource::<VertexDrag>()
        .init_resource::<SavedAnnotations>()
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                apply_scene_settings,
                load_point_cloud,
                camera_controller,
                panel_button_interaction,
                reflect_active_tool,
                editor_keyboard_shortcuts,
                handle_editor_commands,
            ),
        )
        // Pointer routing order is load-bearing: a press may grab a handle
        // before any placement runs, and release always clears the grab.
        .add_systems(
            Update,
            (
                begin_vertex_drag,
                line_draw_system,
                polygon_draw_system,
                drag_vertex_motion,
                release_vertex_drag,
            )
                .chain()
                .after(handle_editor_commands),
        );

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(Window {
            title: "Point Cloud Annotator".into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    spawn_camera(&mut commands);
    spawn_lighting(&mut commands);
    commands.insert_resource(MarkerAssets::create(&mut meshes, &mut materials));
    spawn_annotation_panel(commands);
}

fn spawn_camera(commands: &mut Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 250.0, 250.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
}
