// Rigid body and collider recipes for each body role

use rapier2d::prelude::*;

use super::collision::CollisionGroups;
use super::substrate::{BodyDesc, BodyRole};

/// Physical behaviour shared by every body of one role
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleProfile {
    pub body_type: RigidBodyType,
    /// Multiplier on world gravity (the player controller integrates its own)
    pub gravity_scale: Real,
    pub friction: Real,
    /// Overlap-only volume with no physical response
    pub sensor: bool,
    /// Keep reporting contacts against fixed bodies while switched to kinematic
    pub detect_while_kinematic: bool,
}

impl RoleProfile {
    pub fn for_role(role: BodyRole) -> Self {
        match role {
            BodyRole::Player => Self {
                body_type: RigidBodyType::Dynamic,
                gravity_scale: 0.0,
                friction: 0.0,
                sensor: false,
                detect_while_kinematic: true,
            },
            BodyRole::Enemy => Self {
                body_type: RigidBodyType::Dynamic,
                gravity_scale: 1.0,
                friction: 0.0,
                sensor: false,
                detect_while_kinematic: true,
            },
            BodyRole::Platform => Self {
                body_type: RigidBodyType::Fixed,
                gravity_scale: 0.0,
                friction: 0.3,
                sensor: false,
                detect_while_kinematic: false,
            },
            BodyRole::Trigger => Self {
                body_type: RigidBodyType::Fixed,
                gravity_scale: 0.0,
                friction: 0.0,
                sensor: true,
                detect_while_kinematic: true,
            },
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.body_type == RigidBodyType::Dynamic
    }
}

/// Build the rigid body described by `desc`
pub fn rigid_body(desc: &BodyDesc) -> RigidBody {
    let profile = RoleProfile::for_role(desc.role);
    let mut builder = RigidBodyBuilder::new(profile.body_type)
        .translation(vector![desc.position.x, desc.position.y])
        .gravity_scale(profile.gravity_scale);

    if profile.is_dynamic() {
        // Box characters never tip over physically; the controllers own rotation
        builder = builder
            .lock_rotations()
            .linear_damping(0.0)
            .can_sleep(false);
    }

    builder.build()
}

/// Build the box collider described by `desc`
pub fn collider(desc: &BodyDesc) -> Collider {
    let profile = RoleProfile::for_role(desc.role);
    let half = desc.size * 0.5;
    let active = if profile.detect_while_kinematic {
        ActiveCollisionTypes::all()
    } else {
        ActiveCollisionTypes::default()
    };

    ColliderBuilder::cuboid(half.x, half.y)
        .collision_groups(CollisionGroups::for_role(desc.role).to_interaction_groups())
        .sensor(profile.sensor)
        .friction(profile.friction)
        .restitution(0.0)
        .active_collision_types(active)
        .build()
}
