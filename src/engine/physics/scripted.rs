// In-memory substrate for controller tests.
//
// Bodies are axis-aligned boxes. `step` integrates free bodies by their
// velocity (no gravity, no solving), sweeps are exact along the four axis
// directions, and contacts are whatever the test scripts with `touch`.

use std::collections::HashMap;

use glam::Vec2;

use super::substrate::{BodyDesc, BodyHandle, BodyRole, BoxCast, Contact, ShapeHit, Substrate};

#[derive(Debug, Clone)]
struct ScriptedBody {
    role: BodyRole,
    position: Vec2,
    size: Vec2,
    velocity: Vec2,
    kinematic: bool,
}

#[derive(Debug, Default)]
pub struct ScriptedWorld {
    bodies: HashMap<BodyHandle, ScriptedBody>,
    contacts: HashMap<BodyHandle, Vec<Contact>>,
    next_index: u32,
}

impl ScriptedWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, role: BodyRole, position: Vec2, size: Vec2) -> BodyHandle {
        self.create_body(&BodyDesc::new(role, position, size))
    }

    /// Report a contact between `a` and `b`; `normal` points from `b` into `a`
    pub fn touch(&mut self, a: BodyHandle, b: BodyHandle, normal: Vec2) {
        let trigger = self.is_trigger(a) || self.is_trigger(b);
        let normal = if trigger { Vec2::ZERO } else { normal };
        self.contacts.entry(a).or_default().push(Contact {
            other: b,
            normal,
            trigger,
        });
        self.contacts.entry(b).or_default().push(Contact {
            other: a,
            normal: -normal,
            trigger,
        });
    }

    /// Stop reporting any contact between `a` and `b`
    pub fn separate(&mut self, a: BodyHandle, b: BodyHandle) {
        if let Some(list) = self.contacts.get_mut(&a) {
            list.retain(|c| c.other != b);
        }
        if let Some(list) = self.contacts.get_mut(&b) {
            list.retain(|c| c.other != a);
        }
    }

    fn is_trigger(&self, handle: BodyHandle) -> bool {
        self.bodies
            .get(&handle)
            .map(|b| b.role == BodyRole::Trigger)
            .unwrap_or(false)
    }
}

impl Substrate for ScriptedWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let handle = BodyHandle::from_raw_parts(self.next_index, 0);
        self.next_index += 1;
        self.bodies.insert(
            handle,
            ScriptedBody {
                role: desc.role,
                position: desc.position,
                size: desc.size,
                velocity: Vec2::ZERO,
                kinematic: false,
            },
        );
        handle
    }

    fn remove_body(&mut self, body: BodyHandle) {
        self.bodies.remove(&body);
        self.contacts.remove(&body);
        for list in self.contacts.values_mut() {
            list.retain(|c| c.other != body);
        }
    }

    fn is_alive(&self, body: BodyHandle) -> bool {
        self.bodies.contains_key(&body)
    }

    fn position(&self, body: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&body).map(|b| b.position)
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec2) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.position = position;
        }
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        if let Some(b) = self.bodies.get_mut(&body) {
            if !b.kinematic {
                b.velocity = velocity;
            }
        }
    }

    fn set_kinematic(&mut self, body: BodyHandle, kinematic: bool) {
        if let Some(b) = self.bodies.get_mut(&body) {
            if b.kinematic != kinematic {
                b.kinematic = kinematic;
                b.velocity = Vec2::ZERO;
            }
        }
    }

    fn is_kinematic(&self, body: BodyHandle) -> bool {
        self.bodies.get(&body).map(|b| b.kinematic).unwrap_or(false)
    }

    fn contacts(&self, body: BodyHandle) -> Vec<Contact> {
        self.contacts.get(&body).cloned().unwrap_or_default()
    }

    fn cast_box(&self, cast: &BoxCast) -> Vec<ShapeHit> {
        let half = cast.size * 0.5;
        // Axis of travel and the perpendicular axis
        let along_x = cast.direction.x.abs() >= cast.direction.y.abs();
        let forward = if along_x {
            cast.direction.x.signum()
        } else {
            cast.direction.y.signum()
        };

        let mut hits: Vec<ShapeHit> = self
            .bodies
            .iter()
            .filter(|(handle, _)| Some(**handle) != cast.exclude)
            .filter_map(|(handle, body)| {
                let other_half = body.size * 0.5;
                let delta = body.position - cast.origin;
                let (gap_along, gap_across, reach_across) = if along_x {
                    (delta.x * forward, delta.y.abs(), half.y + other_half.y)
                } else {
                    (delta.y * forward, delta.x.abs(), half.x + other_half.x)
                };
                if gap_across >= reach_across {
                    return None;
                }
                let reach_along = if along_x {
                    half.x + other_half.x
                } else {
                    half.y + other_half.y
                };
                if gap_along + reach_along <= 0.0 {
                    // Entirely behind the caster
                    return None;
                }
                let distance = (gap_along - reach_along).max(0.0);
                (distance <= cast.max_distance).then_some(ShapeHit {
                    distance,
                    body: *handle,
                    trigger: body.role == BodyRole::Trigger,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn step(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            if !body.kinematic && body.role != BodyRole::Platform {
                body.position += body.velocity * dt;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_hits_wall_ahead_only() {
        let mut world = ScriptedWorld::new();
        let me = world.add(BodyRole::Player, Vec2::ZERO, Vec2::splat(0.5));
        let wall = world.add(BodyRole::Platform, Vec2::new(1.0, 0.0), Vec2::splat(0.5));
        world.add(BodyRole::Platform, Vec2::new(-1.0, 0.0), Vec2::splat(0.5));

        let hits = world.cast_box(&BoxCast {
            origin: Vec2::ZERO,
            size: Vec2::splat(0.5),
            direction: Vec2::X,
            max_distance: 1.0,
            exclude: Some(me),
        });
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].body, wall);
        assert!((hits[0].distance - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_touch_is_symmetric() {
        let mut world = ScriptedWorld::new();
        let a = world.add(BodyRole::Player, Vec2::ZERO, Vec2::splat(0.5));
        let b = world.add(BodyRole::Platform, Vec2::new(0.0, -0.5), Vec2::splat(0.5));
        world.touch(a, b, Vec2::Y);

        assert_eq!(world.contacts(a)[0].normal, Vec2::Y);
        assert_eq!(world.contacts(b)[0].normal, -Vec2::Y);

        world.separate(a, b);
        assert!(world.contacts(a).is_empty());
    }
}
