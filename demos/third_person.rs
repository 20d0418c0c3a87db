//! A third-person character walking around a flat scene.
//!
//! WASD / left stick moves relative to the camera, mouse / right stick orbits
//! the camera, Shift / left-stick click sprints and Space / South jumps.
//! Tunables are read from `assets/locomotion.toml` when present.

use avian3d::prelude::*;
use bevy::{prelude::*, window::CursorGrabMode};
use bevy_framepace::FramepacePlugin;

use locomotion::*;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            PhysicsPlugins::default(),
            FramepacePlugin,
            LocomotionInputPlugin,
            LocomotionPlugin,
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, (manage_cursor, display_text))
        .run();
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::FULL_DAYLIGHT,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 7.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let config = load_config_or_default("assets/locomotion.toml");
    let height = 1.8;
    let character = commands
        .spawn((
            Collider::cylinder(0.4, height),
            Friction::new(0.0),
            Restitution {
                coefficient: 0.0,
                combine_rule: CoefficientCombine::Min,
            },
            LinearVelocity::ZERO,
            RigidBody::Dynamic,
            LockedAxes::ROTATION_LOCKED,
            Mass(1.0),
            GravityScale(1.0),
            Transform::from_xyz(0.0, 1.5, 0.0),
            Mesh3d(meshes.add(Cylinder::new(0.4, height))),
            MeshMaterial3d(materials.add(Color::srgb(0.3, 0.5, 0.8))),
            CharacterBody::default(),
            ThirdPersonCharacter::new(config),
        ))
        .id();

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: std::f32::consts::TAU / 6.0,
            ..default()
        }),
        Transform::default(),
        FollowCamera {
            target: character,
            distance: 6.0,
            height_offset: 1.2,
        },
    ));

    // A cube to move around
    commands.spawn((
        RigidBody::Dynamic,
        Collider::cuboid(1.0, 1.0, 1.0),
        Mesh3d(meshes.add(Cuboid::default())),
        MeshMaterial3d(materials.add(Color::srgb(0.8, 0.7, 0.6))),
        Transform::from_xyz(3.0, 2.0, 3.0),
    ));

    // floor
    commands.spawn((
        Friction::new(0.99),
        RigidBody::Static,
        Collider::cuboid(100.0, 1.0, 100.0),
        Mesh3d(meshes.add(Cuboid::new(100.0, 1.0, 100.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.8, 0.7, 0.6))),
        Transform::from_xyz(0.0, -0.5, 0.0),
    ));

    commands.spawn((
        Text::default(),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(8.0),
            left: Val::Px(8.0),
            ..default()
        },
    ));
}

fn manage_cursor(
    btn: Res<ButtonInput<MouseButton>>,
    key: Res<ButtonInput<KeyCode>>,
    mut window_query: Query<&mut Window>,
    mut bindings: ResMut<LocomotionBindings>,
) {
    for mut window in &mut window_query {
        if btn.just_pressed(MouseButton::Left) {
            window.cursor_options.grab_mode = CursorGrabMode::Locked;
            window.cursor_options.visible = false;
            bindings.enable_input = true;
        }
        if key.just_pressed(KeyCode::Escape) {
            window.cursor_options.grab_mode = CursorGrabMode::None;
            window.cursor_options.visible = true;
            bindings.enable_input = false;
        }
    }
}

fn display_text(
    character_query: Query<(&ThirdPersonCharacter, &CharacterBody, &LinearVelocity)>,
    mut text_query: Query<&mut Text>,
) {
    for (character, body, velocity) in &character_query {
        let controller = &character.controller;
        for mut text in &mut text_query {
            text.0 = format!(
                "state: {}\ndirection: {}\ncamera yaw: {:.1}\nsprint: {}\ngrounded: {}\nspd: {:.2}",
                controller.current_state(),
                controller.movement_direction_name(),
                controller.camera_yaw(),
                controller.is_sprinting(),
                body.is_grounded(),
                planar(velocity.0).length()
            );
        }
    }
}
