// Test helpers: a collaborator that records every notification

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use super::combat::{Collaborators, Cosmetics, ProgressSink, ProjectileLauncher};
use crate::engine::physics::BodyHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum Note {
    Completed(String),
    Progress(String, u32),
    Shake(f32, f32),
    Punch(Vec2),
    HitFlash(BodyHandle, f32),
    Squash(BodyHandle),
    DeathFall(Vec2),
    Projectile(Vec2, bool),
}

/// Shared log of notifications; clones write to the same log
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    notes: Rc<RefCell<Vec<Note>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::none()
            .with_progress(self.clone())
            .with_cosmetics(self.clone())
            .with_projectiles(self.clone())
    }

    pub fn notes(&self) -> Vec<Note> {
        self.notes.borrow().clone()
    }

    pub fn has(&self, note: &Note) -> bool {
        self.notes.borrow().contains(note)
    }

    /// Quest ids touched in any way, in order
    pub fn quests(&self) -> Vec<String> {
        self.notes
            .borrow()
            .iter()
            .filter_map(|n| match n {
                Note::Completed(id) | Note::Progress(id, _) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, note: Note) {
        self.notes.borrow_mut().push(note);
    }
}

impl ProgressSink for Recorder {
    fn complete_quest(&mut self, id: &str) {
        self.push(Note::Completed(id.to_string()));
    }

    fn add_progress(&mut self, id: &str, amount: u32) {
        self.push(Note::Progress(id.to_string(), amount));
    }
}

impl Cosmetics for Recorder {
    fn camera_shake(&mut self, duration: f32, magnitude: f32) {
        self.push(Note::Shake(duration, magnitude));
    }

    fn camera_punch(&mut self, direction: Vec2, _duration: f32) {
        self.push(Note::Punch(direction));
    }

    fn hit_flash(&mut self, target: BodyHandle, duration: f32) {
        self.push(Note::HitFlash(target, duration));
    }

    fn squash_stretch(&mut self, target: BodyHandle, _scale: Vec2, _duration: f32) {
        self.push(Note::Squash(target));
    }

    fn death_fall(&mut self, position: Vec2) {
        self.push(Note::DeathFall(position));
    }
}

impl ProjectileLauncher for Recorder {
    fn spawn_projectile(&mut self, origin: Vec2, facing_right: bool) {
        self.push(Note::Projectile(origin, facing_right));
    }
}
