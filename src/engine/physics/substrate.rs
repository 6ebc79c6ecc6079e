// Boundary between the gameplay controllers and whatever integrates bodies.
//
// Controllers never talk to rapier directly: they read positions and contacts,
// write positions (kinematic phases) or velocities (dynamic phases), and flip
// the per-body mode through this trait. `PhysicsWorld` is the production
// implementation.

use glam::Vec2;

/// Handle identifying a body in the substrate
pub type BodyHandle = rapier2d::prelude::RigidBodyHandle;

/// What a body is used for; selects body type, collider shape and groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRole {
    /// The player avatar (dynamic, controller-integrated gravity)
    Player,
    /// An enemy (dynamic, substrate gravity)
    Enemy,
    /// Static level geometry
    Platform,
    /// Static trigger volume (spikes, pads, pickups)
    Trigger,
}

/// Description of a box body to create
#[derive(Debug, Clone, Copy)]
pub struct BodyDesc {
    pub role: BodyRole,
    pub position: Vec2,
    /// Full width and height
    pub size: Vec2,
}

impl BodyDesc {
    pub fn new(role: BodyRole, position: Vec2, size: Vec2) -> Self {
        Self {
            role,
            position,
            size,
        }
    }
}

/// One touching point as seen from the reporting body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// The body being touched
    pub other: BodyHandle,
    /// Unit normal pointing away from `other`'s surface into the reporting body.
    /// Zero for trigger overlaps.
    pub normal: Vec2,
    /// True when `other` is a trigger volume (no physical response)
    pub trigger: bool,
}

/// Box sweep query
#[derive(Debug, Clone, Copy)]
pub struct BoxCast {
    pub origin: Vec2,
    /// Full width and height of the swept box
    pub size: Vec2,
    /// Unit sweep direction
    pub direction: Vec2,
    pub max_distance: f32,
    /// Body ignored by the sweep (usually the caster itself)
    pub exclude: Option<BodyHandle>,
}

/// A single sweep hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeHit {
    pub distance: f32,
    pub body: BodyHandle,
    pub trigger: bool,
}

/// Physics substrate consumed by the gameplay layer
pub trait Substrate {
    /// Create a box body and return its handle
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle;

    /// Remove a body and its collider
    fn remove_body(&mut self, body: BodyHandle);

    /// Whether the body still exists
    fn is_alive(&self, body: BodyHandle) -> bool;

    /// Current position of the body's center
    fn position(&self, body: BodyHandle) -> Option<Vec2>;

    /// Teleport the body (used every tick by kinematic phases)
    fn set_position(&mut self, body: BodyHandle, position: Vec2);

    /// Hand a velocity to the substrate (dynamic phases only)
    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2);

    /// Switch between kinematic (controller owns position) and dynamic modes
    fn set_kinematic(&mut self, body: BodyHandle, kinematic: bool);

    /// Whether the body is currently kinematic
    fn is_kinematic(&self, body: BodyHandle) -> bool;

    /// Everything the body touches after the last step
    fn contacts(&self, body: BodyHandle) -> Vec<Contact>;

    /// Sweep a box and return every hit sorted by distance
    fn cast_box(&self, cast: &BoxCast) -> Vec<ShapeHit>;

    /// Advance free bodies by `dt` seconds and refresh contacts
    fn step(&mut self, dt: f32);
}

/// Closest solid hit of a sweep, ignoring triggers
pub fn first_solid_hit(hits: &[ShapeHit]) -> Option<&ShapeHit> {
    hits.iter()
        .filter(|hit| !hit.trigger)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}
