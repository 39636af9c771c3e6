use bevy::prelude::*;

use crate::tools::tool_manager::{EditorCommand, ToolManager, ToolType};

const BUTTON_IDLE: Color = Color::srgb(0.22, 0.24, 0.28);
const BUTTON_HOVER: Color = Color::srgb(0.26, 0.28, 0.32);
const BUTTON_PRESSED: Color = Color::srgb(0.18, 0.20, 0.24);
const BUTTON_ACTIVE: Color = Color::srgb(0.0, 0.55, 0.0);

#[derive(Component)]
pub struct AnnotationPanel;

/// A panel button and the editor command it issues when pressed.
#[derive(Component)]
pub struct PanelButton(pub EditorCommand);

/// Spawns the annotation command panel: start/save/delete for lines and
/// polygons, stacked in a left-hand column.
pub fn spawn_annotation_panel(mut commands: Commands) {
    commands
        .spawn((
            AnnotationPanel,
            Name::new("AnnotationPanel"),
            BackgroundColor(Color::srgb(0.10, 0.11, 0.13)),
            Node {
                width: Val::Px(180.0),
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(0.0),
                padding: UiRect::all(Val::Px(8.0)),
                row_gap: Val::Px(6.0),
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Stretch,
                ..default()
            },
        ))
        .with_children(|panel| {
            spawn_panel_button(panel, "Draw Line", EditorCommand::StartLine);
            spawn_panel_button(panel, "Save Line", EditorCommand::SaveLine);
            spawn_panel_button(panel, "Delete Line", EditorCommand::DeleteLine);
            spawn_panel_button(panel, "Draw Polygon", EditorCommand::StartPolygon);
            spawn_panel_button(panel, "Save Polygon", EditorCommand::SavePolygon);
            spawn_panel_button(panel, "Delete Polygon", EditorCommand::DeletePolygon);
        });
}

fn spawn_panel_button(panel: &mut ChildSpawnerCommands, label: &str, command: EditorCommand) {
    panel
        .spawn((
            PanelButton(command),
            Button,
            Name::new(format!("{label} button")),
            BackgroundColor(BUTTON_IDLE),
            BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
            Node {
                width: Val::Percent(100.0),
                height: Val::Px(32.0),
                display: Display::Flex,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new(label),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 1.0, 1.0)),
            ));
        });
}

/// Issues the button's command on press and keeps hover/press feedback.
/// The two draw buttons keep the active colour while their mode is on.
pub fn panel_button_interaction(
    mut q: Query<
        (&Interaction, &PanelButton, &mut BackgroundColor),
        (Changed<Interaction>, With<Button>),
    >,
    tool_manager: Res<ToolManager>,
    mut editor_commands: EventWriter<EditorCommand>,
) {
    for (interaction, button, mut bg) in &mut q {
        match *interaction {
            Interaction::Pressed => {
                editor_commands.write(button.0);
                *bg = BackgroundColor(BUTTON_PRESSED);
            }
            Interaction::Hovered => *bg = BackgroundColor(BUTTON_HOVER),
            Interaction::None => *bg = BackgroundColor(resting_color(button.0, &tool_manager)),
        }
    }
}

/// Repaints resting buttons when the active tool changes without any
/// pointer interaction (keyboard shortcuts, saves).
pub fn reflect_active_tool(
    tool_manager: Res<ToolManager>,
    mut q: Query<(&Interaction, &PanelButton, &mut BackgroundColor), With<Button>>,
) {
    if !tool_manager.is_changed() {
        return;
    }
    for (interaction, button, mut bg) in &mut q {
        if *interaction == Interaction::None {
            *bg = BackgroundColor(resting_color(button.0, &tool_manager));
        }
    }
}

fn resting_color(command: EditorCommand, tool_manager: &ToolManager) -> Color {
    let active = match command {
        EditorCommand::StartLine => tool_manager.is_tool_active(ToolType::Line),
        EditorCommand::StartPolygon => tool_manager.is_tool_active(ToolType::Polygon),
        _ => false,
    };
    if active { BUTTON_ACTIVE } else { BUTTON_IDLE }
}
