use rapier2d::prelude::*;

use super::substrate::BodyRole;

/// Collision groups for filtering what objects can collide with each other
///
/// The player and enemies must touch each other (stomps and contact damage),
/// while triggers only ever report overlaps with the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroups {
    /// Default group - interacts with everything
    Default = 0b0000_0001,

    /// The player avatar
    Player = 0b0000_0010,

    /// Enemies
    Enemy = 0b0000_0100,

    /// Static platforms and walls
    Platform = 0b0000_1000,

    /// Trigger volumes (spikes, pressure pads, pickups)
    Trigger = 0b0001_0000,
}

impl CollisionGroups {
    /// Group used by a body role
    pub fn for_role(role: BodyRole) -> Self {
        match role {
            BodyRole::Player => CollisionGroups::Player,
            BodyRole::Enemy => CollisionGroups::Enemy,
            BodyRole::Platform => CollisionGroups::Platform,
            BodyRole::Trigger => CollisionGroups::Trigger,
        }
    }

    /// Convert to rapier2d's InteractionGroups
    pub fn to_interaction_groups(self) -> InteractionGroups {
        let memberships = Group::from_bits_truncate(self as u32);

        let filter = match self {
            // The player touches everything in the level
            CollisionGroups::Player => Group::from_bits_truncate(
                CollisionGroups::Platform as u32
                    | CollisionGroups::Enemy as u32
                    | CollisionGroups::Trigger as u32,
            ),

            // Enemies ignore triggers and each other
            CollisionGroups::Enemy => Group::from_bits_truncate(
                CollisionGroups::Platform as u32 | CollisionGroups::Player as u32,
            ),

            CollisionGroups::Platform => Group::from_bits_truncate(
                CollisionGroups::Player as u32
                    | CollisionGroups::Enemy as u32
                    | CollisionGroups::Platform as u32,
            ),

            // Triggers only react to the player
            CollisionGroups::Trigger => Group::from_bits_truncate(CollisionGroups::Player as u32),

            CollisionGroups::Default => Group::ALL,
        };

        InteractionGroups::new(memberships, filter)
    }
}
