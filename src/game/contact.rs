// Contact interpretation shared by both controllers
//
// The substrate reports what a body touches after each step. The tracker turns
// those per-tick lists into enter/stay/exit events per touched body, and the
// helpers below classify each normal the same way for everyone.

use glam::Vec2;

use crate::engine::physics::{BodyHandle, Contact, Substrate};

/// Which way a contact normal faces, by dominant axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactAxis {
    /// Surface below the reporting body (normal points up)
    Ground,
    /// Surface above the reporting body (normal points down)
    Ceiling,
    /// Surface to the side
    Wall,
}

/// Classify a normal; ties between the axes count as walls
pub fn classify(normal: Vec2) -> ContactAxis {
    if normal.y.abs() > normal.x.abs() {
        if normal.y > 0.0 {
            ContactAxis::Ground
        } else {
            ContactAxis::Ceiling
        }
    } else {
        ContactAxis::Wall
    }
}

/// Whether moving at `velocity_x` pushes into a wall with this normal
pub fn opposes(normal_x: f32, velocity_x: f32) -> bool {
    (normal_x > 0.0 && velocity_x < 0.0) || (normal_x < 0.0 && velocity_x > 0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    /// First tick touching this body
    Enter,
    /// Still touching
    Stay,
    /// Stopped touching (no normals)
    Exit,
}

/// All contact points with one other body during one tick
#[derive(Debug, Clone, PartialEq)]
pub struct ContactEvent {
    pub phase: ContactPhase,
    pub other: BodyHandle,
    pub normals: Vec<Vec2>,
    pub trigger: bool,
}

/// Derives enter/stay/exit events from successive contact lists
#[derive(Debug, Default)]
pub struct ContactTracker {
    touching: Vec<(BodyHandle, bool)>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume this tick's contacts and return the events, exits last
    pub fn update(&mut self, contacts: &[Contact]) -> Vec<ContactEvent> {
        let mut events: Vec<ContactEvent> = Vec::new();

        for contact in contacts {
            match events.iter_mut().find(|e| e.other == contact.other) {
                Some(event) => {
                    if !contact.trigger {
                        event.normals.push(contact.normal);
                    }
                }
                None => {
                    let phase = if self.is_touching(contact.other) {
                        ContactPhase::Stay
                    } else {
                        ContactPhase::Enter
                    };
                    events.push(ContactEvent {
                        phase,
                        other: contact.other,
                        normals: if contact.trigger {
                            Vec::new()
                        } else {
                            vec![contact.normal]
                        },
                        trigger: contact.trigger,
                    });
                }
            }
        }

        let still_touching: Vec<(BodyHandle, bool)> =
            events.iter().map(|e| (e.other, e.trigger)).collect();

        for &(other, trigger) in &self.touching {
            if !still_touching.iter().any(|(h, _)| *h == other) {
                events.push(ContactEvent {
                    phase: ContactPhase::Exit,
                    other,
                    normals: Vec::new(),
                    trigger,
                });
            }
        }

        self.touching = still_touching;
        events
    }

    pub fn is_touching(&self, other: BodyHandle) -> bool {
        self.touching.iter().any(|(h, _)| *h == other)
    }

    /// Forget everything (next update reports only enters)
    pub fn clear(&mut self) {
        self.touching.clear();
    }
}

/// Bodies currently supporting the player
///
/// Handles are weak: a body that no longer exists is dropped the next time
/// grounding is queried.
#[derive(Debug, Default, Clone)]
pub struct GroundSet {
    bodies: Vec<BodyHandle>,
}

impl GroundSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, body: BodyHandle) {
        if !self.bodies.contains(&body) {
            self.bodies.push(body);
        }
    }

    pub fn remove(&mut self, body: BodyHandle) {
        self.bodies.retain(|b| *b != body);
    }

    pub fn contains(&self, body: BodyHandle) -> bool {
        self.bodies.contains(&body)
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Drop dead handles, then report whether anything is left
    pub fn is_grounded<S: Substrate + ?Sized>(&mut self, substrate: &S) -> bool {
        self.bodies.retain(|b| substrate.is_alive(*b));
        !self.bodies.is_empty()
    }
}
