use std::{collections::HashMap, path::Path};

use avian3d::prelude::*;
use bevy::prelude::*;

use crate::{
    CameraSource, ClipId, ClipPlayer, Host, LocomotionAction, LocomotionConfig,
    LocomotionController, MovementBody, yaw_of,
};

/// Runs third-person locomotion for every [`ThirdPersonCharacter`].
///
/// The controller ticks in `FixedUpdate`; the follow camera is placed in
/// `Update` from the character's look rig. Input comes from
/// [`LocomotionAction`] events, normally written by
/// [`LocomotionInputPlugin`](crate::LocomotionInputPlugin).
pub struct LocomotionPlugin;

pub static TICK_HZ: f64 = 96.0;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<LocomotionAction>()
            .insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
            .add_systems(FixedUpdate, locomotion_tick)
            .add_systems(Update, follow_camera_render);
        info!("locomotion ticking at {TICK_HZ} Hz");
    }
}

#[derive(Component, Default)]
pub struct ThirdPersonCharacter {
    pub controller: LocomotionController,
}

impl ThirdPersonCharacter {
    pub fn new(config: LocomotionConfig) -> Self {
        Self {
            controller: LocomotionController::new(config),
        }
    }
}

/// Physics-side state behind the controller's movement body.
#[derive(Component)]
pub struct CharacterBody {
    /// If the distance to the ground is less than this value, the character is considered grounded
    pub grounded_distance: f32,
    pub acceleration: f32,
    /// Horizontal speed lost per second on the ground when no move is requested.
    pub braking: f32,
    target_speed: f32,
    grounded: bool,
    launched: bool,
    moved: bool,
}

impl Default for CharacterBody {
    fn default() -> Self {
        Self {
            grounded_distance: 0.125,
            acceleration: 10.0,
            braking: 10.0,
            target_speed: 0.0,
            grounded: false,
            launched: false,
            moved: false,
        }
    }
}

impl CharacterBody {
    pub fn target_speed(&self) -> f32 {
        self.target_speed
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }
}

/// Places a camera behind `target`, orbiting with the target's look rig.
#[derive(Component)]
pub struct FollowCamera {
    pub target: Entity,
    pub distance: f32,
    pub height_offset: f32,
}

/// Maps clip names to nodes of the animation graph driving `player`.
#[derive(Component, Default)]
pub struct CharacterAnimations {
    pub player: Option<Entity>,
    nodes: HashMap<ClipId, AnimationNodeIndex>,
    clips: HashMap<ClipId, Handle<AnimationClip>>,
}

impl CharacterAnimations {
    /// Builds a flat graph with one node per clip.
    ///
    /// The returned graph handle goes on the player entity as an
    /// [`AnimationGraphHandle`].
    pub fn from_clips(
        clips: impl IntoIterator<Item = (ClipId, Handle<AnimationClip>)>,
        graphs: &mut Assets<AnimationGraph>,
    ) -> (Self, Handle<AnimationGraph>) {
        let mut graph = AnimationGraph::new();
        let mut library = Self::default();
        for (id, clip) in clips {
            let node = graph.add_clip(clip.clone(), 1.0, graph.root);
            library.nodes.insert(id.clone(), node);
            library.clips.insert(id, clip);
        }
        (library, graphs.add(graph))
    }

    pub fn with_player(mut self, player: Entity) -> Self {
        self.player = Some(player);
        self
    }
}

// ██╗      ██████╗  ██████╗ ██╗ ██████╗
// ██║     ██╔═══██╗██╔════╝ ██║██╔════╝
// ██║     ██║   ██║██║  ███╗██║██║
// ██║     ██║   ██║██║   ██║██║██║
// ███████╗╚██████╔╝╚██████╔╝██║╚██████╗
// ╚══════╝ ╚═════╝  ╚═════╝ ╚═╝ ╚═════╝

const SLIGHT_SCALE_DOWN: f32 = 0.9375;

/// Ground-plane coordinates of a world vector. The planar frame is `(x, z)`.
pub fn planar(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

pub fn world_from_planar(p: Vec2) -> Vec3 {
    Vec3::new(p.x, 0.0, p.y)
}

/// Rotation whose forward (-Z) points along planar `yaw`.
pub fn rotation_from_yaw(yaw: f32) -> Quat {
    Quat::from_rotation_y((-yaw - 90.0).to_radians())
}

pub fn yaw_from_rotation(rotation: Quat) -> f32 {
    yaw_of(planar(rotation * Vec3::NEG_Z))
}

impl CameraSource for Transform {
    fn current_yaw(&self) -> f32 {
        yaw_of(planar(*self.forward()))
    }
}

struct AvianBody<'w> {
    state: &'w mut CharacterBody,
    transform: &'w mut Transform,
    velocity: &'w mut LinearVelocity,
    dt: f32,
}

impl MovementBody for AvianBody<'_> {
    fn set_target_speed(&mut self, speed: f32) {
        self.state.target_speed = speed;
    }

    fn set_vertical_velocity(&mut self, velocity: f32) {
        self.velocity.0.y = velocity;
    }

    fn vertical_velocity(&self) -> f32 {
        self.velocity.0.y
    }

    fn is_grounded(&self) -> bool {
        self.state.grounded
    }

    fn is_airborne(&self) -> bool {
        !self.state.grounded
    }

    fn begin_airborne(&mut self) {
        self.state.launched = true;
        self.state.grounded = false;
    }

    fn apply_planar_move(&mut self, direction: Vec2, intensity: f32) {
        let wish_direction = world_from_planar(direction).normalize_or_zero();
        let wish_speed = self.state.target_speed * intensity;
        self.velocity.0 += acceleration(
            wish_direction,
            wish_speed,
            self.state.acceleration,
            self.velocity.0,
            self.dt,
        );
        self.state.moved = true;
    }

    fn set_yaw(&mut self, yaw: f32) {
        self.transform.rotation = rotation_from_yaw(yaw);
    }

    fn yaw(&self) -> f32 {
        yaw_from_rotation(self.transform.rotation)
    }
}

struct BevyClipPlayer<'w> {
    player: Mut<'w, AnimationPlayer>,
    library: &'w CharacterAnimations,
    clips: &'w Assets<AnimationClip>,
}

impl ClipPlayer for BevyClipPlayer<'_> {
    fn play(&mut self, clip: &ClipId, looping: bool, rate: f32) {
        let Some(&node) = self.library.nodes.get(clip) else {
            debug!("clip {clip} is not in the animation graph");
            return;
        };
        let active = self.player.play(node);
        if looping {
            active.repeat();
        }
        active.set_speed(rate);
    }

    fn stop(&mut self) {
        self.player.stop_all();
    }

    fn clip_length(&self, clip: &ClipId) -> Option<f32> {
        let handle = self.library.clips.get(clip)?;
        self.clips.get(handle).map(AnimationClip::duration)
    }
}

pub fn locomotion_tick(
    time: Res<Time>,
    spatial_query_pipeline: Res<SpatialQueryPipeline>,
    clips: Res<Assets<AnimationClip>>,
    mut actions: EventReader<LocomotionAction>,
    cameras: Query<(&Transform, &FollowCamera), Without<ThirdPersonCharacter>>,
    mut players: Query<&mut AnimationPlayer>,
    mut query: Query<(
        Entity,
        &mut ThirdPersonCharacter,
        &mut CharacterBody,
        &Collider,
        &mut Transform,
        &mut LinearVelocity,
        Option<&CharacterAnimations>,
    )>,
) {
    let dt = time.delta_secs();
    let actions: Vec<LocomotionAction> = actions.read().copied().collect();

    for (entity, mut character, mut body, collider, mut transform, mut velocity, animations) in
        query.iter_mut()
    {
        // Shape cast downwards to find ground
        let filter = SpatialQueryFilter::default().with_excluded_entities([entity]);
        let ground_hit = spatial_query_pipeline
            .cast_shape(
                &scaled_collider_laterally(collider, SLIGHT_SCALE_DOWN),
                transform.translation,
                transform.rotation,
                Dir3::NEG_Y,
                &ShapeCastConfig::from_max_distance(body.grounded_distance),
                &filter,
            )
            .is_some();
        // Still rising from a jump counts as airborne even with ground in reach
        body.grounded = ground_hit && !(body.launched && velocity.0.y > 0.0);
        if body.grounded {
            body.launched = false;
        }
        body.moved = false;

        let camera = cameras
            .iter()
            .find(|(_, follow)| follow.target == entity)
            .map(|(camera_transform, _)| camera_transform);
        let mut animator = animations.and_then(|library| {
            let player = players.get_mut(library.player?).ok()?;
            Some(BevyClipPlayer {
                player,
                library,
                clips: &clips,
            })
        });
        let mut avian_body = AvianBody {
            state: &mut body,
            transform: &mut transform,
            velocity: &mut velocity,
            dt,
        };

        let mut host = Host {
            camera: camera.map(|t| t as &dyn CameraSource),
            body: Some(&mut avian_body),
            animator: animator.as_mut().map(|a| a as &mut dyn ClipPlayer),
        };
        for action in &actions {
            character.controller.handle_action(*action, &mut host);
        }
        character.controller.tick(dt, &mut host);

        if !body.moved && body.grounded {
            let keep = (1.0 - body.braking * dt).max(0.0);
            velocity.0.x *= keep;
            velocity.0.z *= keep;
        }
    }
}

/// Return a collider that is scaled laterally (XZ plane) but not vertically (Y axis).
fn scaled_collider_laterally(collider: &Collider, scale: f32) -> Collider {
    match collider.shape().as_cylinder() {
        Some(cylinder) => Collider::cylinder(cylinder.radius * scale, cylinder.half_height * 2.0),
        None => collider.clone(),
    }
}

fn acceleration(
    wish_direction: Vec3,
    wish_speed: f32,
    acceleration: f32,
    velocity: Vec3,
    dt: f32,
) -> Vec3 {
    let velocity_projection = Vec3::dot(velocity, wish_direction);
    let add_speed = wish_speed - velocity_projection;
    if add_speed <= 0.0 {
        return Vec3::ZERO;
    }

    let acceleration_speed = f32::min(acceleration * wish_speed * dt, add_speed);
    wish_direction * acceleration_speed
}

/// Loads a config file, falling back to [`LocomotionConfig::meters`] when it
/// is missing or malformed.
pub fn load_config_or_default(path: impl AsRef<Path>) -> LocomotionConfig {
    match LocomotionConfig::from_file(path.as_ref()) {
        Ok(config) => config,
        Err(err) => {
            warn!("{err}; using meter-scale default locomotion config");
            LocomotionConfig::meters()
        }
    }
}

// ██████╗ ███████╗███╗   ██╗██████╗ ███████╗██████╗
// ██╔══██╗██╔════╝████╗  ██║██╔══██╗██╔════╝██╔══██╗
// ██████╔╝█████╗  ██╔██╗ ██║██║  ██║█████╗  ██████╔╝
// ██╔══██╗██╔══╝  ██║╚██╗██║██║  ██║██╔══╝  ██╔══██╗
// ██║  ██║███████╗██║ ╚████║██████╔╝███████╗██║  ██║
// ╚═╝  ╚═╝╚══════╝╚═╝  ╚═══╝╚═════╝ ╚══════╝╚═╝  ╚═╝

/// World-space view direction for a look rig yaw and pitch.
pub fn look_direction(yaw: f32, pitch: f32) -> Vec3 {
    let (sin_yaw, cos_yaw) = yaw.to_radians().sin_cos();
    let (sin_pitch, cos_pitch) = pitch.to_radians().sin_cos();
    Vec3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch)
}

pub fn follow_camera_render(
    mut cameras: Query<(&mut Transform, &FollowCamera), Without<ThirdPersonCharacter>>,
    characters: Query<(&Transform, &ThirdPersonCharacter)>,
) {
    for (mut camera_transform, follow) in cameras.iter_mut() {
        if let Ok((target, character)) = characters.get(follow.target) {
            let rig = character.controller.look_rig();
            let forward = look_direction(rig.yaw, rig.pitch);
            let focus = target.translation + Vec3::Y * follow.height_offset;
            *camera_transform = Transform::from_translation(focus - forward * follow.distance)
                .looking_to(forward, Vec3::Y);
        }
    }
}
