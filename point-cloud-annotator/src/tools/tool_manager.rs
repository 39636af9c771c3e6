use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::tools::line::LineSession;
use crate::tools::polygon::PolygonSession;

/// Drawing tools the annotator offers. At most one is active; activating
/// one always deactivates the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    Line,
    Polygon,
}

impl ToolType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Polygon => "polygon",
        }
    }
}

/// Resource tracking the active drawing tool. `None` means idle: clicks
/// place nothing, though vertex handles stay grabbable.
#[derive(Resource, Default)]
pub struct ToolManager {
    active_tool: Option<ToolType>,
}

impl ToolManager {
    /// Activate the given tool, deactivating the other if necessary.
    pub fn activate_tool(&mut self, tool_type: ToolType) -> bool {
        if self.active_tool == Some(tool_type) {
            return false;
        }
        self.active_tool = Some(tool_type);
        info!("Drawing tool activated: {}", tool_type.label());
        true
    }

    /// Return to idle if the given tool is the active one.
    pub fn deactivate_tool(&mut self, tool_type: ToolType) {
        if self.active_tool == Some(tool_type) {
            self.active_tool = None;
            info!("Drawing tool deactivated: {}", tool_type.label());
        }
    }

    pub fn active_tool(&self) -> Option<ToolType> {
        self.active_tool
    }

    pub fn is_tool_active(&self, tool_type: ToolType) -> bool {
        self.active_tool == Some(tool_type)
    }
}

/// Commands from the button panel and the keyboard shortcuts.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    StartLine,
    StartPolygon,
    SaveLine,
    SavePolygon,
    DeleteLine,
    DeletePolygon,
}

/// Marks renderables whose shapes were saved; they stay in the scene after
/// their editing session ends.
#[derive(Component)]
pub struct SavedAnnotation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPolyline {
    pub id: u32,
    pub points: Vec<[f32; 3]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPolygon {
    pub id: u32,
    pub ring: Vec<[f32; 3]>,
}

/// Saved shapes, in save order. Owns the logical sequences; the renderables
/// stay behind in the scene tagged with [`SavedAnnotation`].
#[derive(Resource, Default)]
pub struct SavedAnnotations {
    pub lines: Vec<SavedPolyline>,
    pub polygons: Vec<SavedPolygon>,
    next_id: u32,
}

impl SavedAnnotations {
    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Applies editor commands to the sessions and the tool state. Every
/// mutation of a session happens inside this one handler, so the geometry a
/// frame renders is never a torn intermediate.
pub fn handle_editor_commands(
    mut commands: Commands,
    mut events: EventReader<EditorCommand>,
    mut tool_manager: ResMut<ToolManager>,
    mut line_session: ResMut<LineSession>,
    mut polygon_session: ResMut<PolygonSession>,
    mut saved: ResMut<SavedAnnotations>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    for event in events.read() {
        match event {
            EditorCommand::StartLine => {
                tool_manager.activate_tool(ToolType::Line);
            }
            EditorCommand::StartPolygon => {
                tool_manager.activate_tool(ToolType::Polygon);
            }
            EditorCommand::SaveLine => {
                if !line_session.is_empty() {
                    let (points, entity) = line_session.detach_saved();
                    let record = SavedPolyline {
                        id: saved.next_id(),
                        points: points.iter().map(|p| p.to_array()).collect(),
                    };
                    if let Some(entity) = entity {
                        commands.entity(entity).insert(SavedAnnotation);
                    }
                    match serde_json::to_string(&record) {
                        Ok(json) => info!("Saved polyline: {json}"),
                        Err(err) => warn!("Could not encode saved polyline: {err}"),
                    }
                    saved.lines.push(record);
                }
                tool_manager.deactivate_tool(ToolType::Line);
            }
            EditorCommand::SavePolygon => {
                if polygon_session.len() >= 3 {
                    let (ring, markers, fill) = polygon_session.detach_saved();
                    let record = SavedPolygon {
                        id: saved.next_id(),
                        ring: ring.iter().map(|p| p.to_array()).collect(),
                    };
                    // The markers are editing handles, not part of the saved
                    // overlay; the fill stays behind.
                    for marker in markers {
                        commands.entity(marker).despawn();
                    }
                    if let Some(fill) = fill {
                        commands.entity(fill).insert(SavedAnnotation);
                    }
                    match serde_json::to_string(&record) {
                        Ok(json) => info!("Saved polygon: {json}"),
                        Err(err) => warn!("Could not encode saved polygon: {err}"),
                    }
                    saved.polygons.push(record);
                }
                tool_manager.deactivate_tool(ToolType::Polygon);
            }
            EditorCommand::DeleteLine => {
                let (entity, mesh) = line_session.clear_all();
                if let Some(entity) = entity {
                    commands.entity(entity).despawn();
                }
                if let Some(mesh) = mesh {
                    meshes.remove(&mesh);
                }
                info!("Deleted in-progress polyline");
            }
            EditorCommand::DeletePolygon => {
                let (markers, fill_entity, fill_mesh) = polygon_session.clear_all();
                for marker in markers {
                    commands.entity(marker).despawn();
                }
                if let Some(entity) = fill_entity {
                    commands.entity(entity).despawn();
                }
                if let Some(mesh) = fill_mesh {
                    meshes.remove(&mesh);
                }
                info!("Deleted in-progress polygon");
            }
        }
    }
}

/// Keyboard mirror of the button panel: `L` and `P` start the drawing
/// modes, `Enter` saves the active shape, `Delete` deletes it.
pub fn editor_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    tool_manager: Res<ToolManager>,
    mut editor_commands: EventWriter<EditorCommand>,
) {
    if keyboard.just_pressed(KeyCode::KeyL) {
        editor_commands.write(EditorCommand::StartLine);
    }
    if keyboard.just_pressed(KeyCode::KeyP) {
        editor_commands.write(EditorCommand::StartPolygon);
    }
    if keyboard.just_pressed(KeyCode::Enter) {
        match tool_manager.active_tool() {
            Some(ToolType::Line) => {
                editor_commands.write(EditorCommand::SaveLine);
            }
            Some(ToolType::Polygon) => {
                editor_commands.write(EditorCommand::SavePolygon);
            }
            None => {}
        }
    }
    if keyboard.just_pressed(KeyCode::Delete) {
        match tool_manager.active_tool() {
            Some(ToolType::Line) => {
                editor_commands.write(EditorCommand::DeleteLine);
            }
            Some(ToolType::Polygon) => {
                editor_commands.write(EditorCommand::DeletePolygon);
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drawing_modes_are_mutually_exclusive() {
        let mut manager = ToolManager::default();

        manager.activate_tool(ToolType::Line);
        assert!(manager.is_tool_active(ToolType::Line));
        assert!(!manager.is_tool_active(ToolType::Polygon));

        manager.activate_tool(ToolType::Polygon);
        assert!(manager.is_tool_active(ToolType::Polygon));
        assert!(!manager.is_tool_active(ToolType::Line));
    }

    #[test]
    fn reactivating_the_active_tool_reports_no_change() {
        let mut manager = ToolManager::default();
        assert!(manager.activate_tool(ToolType::Line));
        assert!(!manager.activate_tool(ToolType::Line));
    }

    #[test]
    fn deactivation_only_affects_the_matching_tool() {
        let mut manager = ToolManager::default();
        manager.activate_tool(ToolType::Line);

        manager.deactivate_tool(ToolType::Polygon);
        assert!(manager.is_tool_active(ToolType::Line));

        manager.deactivate_tool(ToolType::Line);
        assert_eq!(manager.active_tool(), None);
    }

    #[test]
    fn saved_ids_are_unique_and_ordered() {
        let mut saved = SavedAnnotations::default();
        let a = saved.next_id();
        let b = saved.next_id();
        assert_ne!(a, b);
        assert!(b > a);
    }
}
