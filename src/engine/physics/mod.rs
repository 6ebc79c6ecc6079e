// Physics substrate: the trait the controllers consume and its rapier2d backing

pub mod body;
mod collision;
#[cfg(test)]
pub mod scripted;
mod substrate;
mod world;

pub use collision::CollisionGroups;
pub use substrate::{
    first_solid_hit, BodyDesc, BodyHandle, BodyRole, BoxCast, Contact, ShapeHit, Substrate,
};
pub use world::PhysicsWorld;
