use glam::Vec2;
use rapier2d::parry::query::ShapeCastOptions;
use rapier2d::parry::shape::Cuboid;
use rapier2d::prelude::*;

use super::body;
use super::substrate::{BodyDesc, BodyHandle, BoxCast, Contact, ShapeHit, Substrate};

/// Upper bound on hits collected by a single sweep
const MAX_CAST_HITS: usize = 8;

/// Physics world that manages all physics simulation
pub struct PhysicsWorld {
    /// Gravity vector applied to free bodies with a non-zero gravity scale
    gravity: Vector<Real>,

    /// Integration parameters for the physics simulation
    integration_parameters: IntegrationParameters,

    /// Physics pipeline handles collision detection and solving
    physics_pipeline: PhysicsPipeline,

    /// Island manager for sleeping bodies
    island_manager: IslandManager,

    /// Broad phase collision detection
    broad_phase: DefaultBroadPhase,

    /// Narrow phase collision detection
    narrow_phase: NarrowPhase,

    /// Impulse joint set
    impulse_joint_set: ImpulseJointSet,

    /// Multibody joint set
    multibody_joint_set: MultibodyJointSet,

    /// CCD solver for fast-moving objects
    ccd_solver: CCDSolver,

    /// Query pipeline for shape casts
    query_pipeline: QueryPipeline,

    /// Rigid body set
    rigid_body_set: RigidBodySet,

    /// Collider set
    collider_set: ColliderSet,
}

impl PhysicsWorld {
    /// Create a new physics world with the default platformer gravity
    pub fn new() -> Self {
        Self::with_gravity(vector![0.0, -30.0])
    }

    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Vector<Real>) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        // Fixed timestep of 1/60 seconds (60 FPS)
        integration_parameters.dt = 1.0 / 60.0;

        Self {
            gravity,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
        }
    }

    /// Add a rigid body to the physics world
    pub fn add_rigid_body(&mut self, body: RigidBody) -> RigidBodyHandle {
        self.rigid_body_set.insert(body)
    }

    /// Add a collider attached to a rigid body
    pub fn add_collider(
        &mut self,
        collider: Collider,
        parent_handle: RigidBodyHandle,
    ) -> ColliderHandle {
        self.collider_set
            .insert_with_parent(collider, parent_handle, &mut self.rigid_body_set)
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    fn body_of(&self, collider: ColliderHandle) -> Option<RigidBodyHandle> {
        self.collider_set.get(collider).and_then(|c| c.parent())
    }

    /// Rebuild the scene-query structure from current collider poses
    fn refresh_queries(&mut self) {
        self.query_pipeline
            .update(&self.rigid_body_set, &self.collider_set);
    }

    fn is_sensor(&self, collider: ColliderHandle) -> bool {
        self.collider_set
            .get(collider)
            .map(|c| c.is_sensor())
            .unwrap_or(false)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Substrate for PhysicsWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let rigid_body = body::rigid_body(desc);
        let collider = body::collider(desc);

        let handle = self.add_rigid_body(rigid_body);
        self.add_collider(collider, handle);
        self.refresh_queries();
        log::trace!("Created {:?} body {:?} at {:?}", desc.role, handle, desc.position);
        handle
    }

    fn remove_body(&mut self, body: BodyHandle) {
        self.rigid_body_set.remove(
            body,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true, // remove attached colliders
        );
        self.refresh_queries();
    }

    fn is_alive(&self, body: BodyHandle) -> bool {
        self.rigid_body_set.contains(body)
    }

    fn position(&self, body: BodyHandle) -> Option<Vec2> {
        self.rigid_body_set.get(body).map(|b| {
            let t = b.translation();
            Vec2::new(t.x, t.y)
        })
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec2) {
        let Some(b) = self.rigid_body_set.get_mut(body) else {
            return;
        };
        // Also resets the next kinematic position
        b.set_translation(vector![position.x, position.y], true);

        // Colliders only follow their body during a pipeline step, so move them now
        let pose = *b.position();
        for &handle in b.colliders() {
            if let Some(collider) = self.collider_set.get_mut(handle) {
                let offset = collider
                    .position_wrt_parent()
                    .copied()
                    .unwrap_or_else(Isometry::identity);
                collider.set_position(pose * offset);
            }
        }
        self.refresh_queries();
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            if b.is_dynamic() {
                b.set_linvel(vector![velocity.x, velocity.y], true);
            }
        }
    }

    fn set_kinematic(&mut self, body: BodyHandle, kinematic: bool) {
        let Some(b) = self.rigid_body_set.get_mut(body) else {
            return;
        };

        let target = if kinematic {
            RigidBodyType::KinematicPositionBased
        } else {
            RigidBodyType::Dynamic
        };

        if b.body_type() != target {
            b.set_body_type(target, true);
            b.set_linvel(Vector::zeros(), true);
        }
    }

    fn is_kinematic(&self, body: BodyHandle) -> bool {
        self.rigid_body_set
            .get(body)
            .map(|b| b.is_kinematic())
            .unwrap_or(false)
    }

    fn contacts(&self, body: BodyHandle) -> Vec<Contact> {
        let Some(rigid_body) = self.rigid_body_set.get(body) else {
            return Vec::new();
        };

        let mut contacts = Vec::new();

        for &collider in rigid_body.colliders() {
            for pair in self.narrow_phase.contact_pairs_with(collider) {
                // The manifold normal points out of collider1 into collider2
                let (other_collider, flip) = if pair.collider1 == collider {
                    (pair.collider2, true)
                } else {
                    (pair.collider1, false)
                };

                let Some(other) = self.body_of(other_collider) else {
                    continue;
                };

                for manifold in &pair.manifolds {
                    if manifold.points.is_empty() {
                        continue;
                    }
                    let n = if flip {
                        -manifold.data.normal
                    } else {
                        manifold.data.normal
                    };
                    contacts.push(Contact {
                        other,
                        normal: Vec2::new(n.x, n.y),
                        trigger: false,
                    });
                }
            }

            for (c1, c2, intersecting) in self.narrow_phase.intersection_pairs_with(collider) {
                if !intersecting {
                    continue;
                }
                let other_collider = if c1 == collider { c2 } else { c1 };
                if let Some(other) = self.body_of(other_collider) {
                    contacts.push(Contact {
                        other,
                        normal: Vec2::ZERO,
                        trigger: true,
                    });
                }
            }
        }

        contacts
    }

    fn cast_box(&self, cast: &BoxCast) -> Vec<ShapeHit> {
        let shape = Cuboid::new(vector![cast.size.x * 0.5, cast.size.y * 0.5]);
        let shape_pos = Isometry::translation(cast.origin.x, cast.origin.y);
        let shape_vel = vector![cast.direction.x, cast.direction.y];

        let mut hit_colliders: Vec<ColliderHandle> = Vec::new();
        let mut hits = Vec::new();

        // rapier only reports the first hit, so sweep repeatedly excluding what was found
        while hits.len() < MAX_CAST_HITS {
            let already_hit =
                |handle: ColliderHandle, _: &Collider| !hit_colliders.contains(&handle);
            let mut filter = QueryFilter::default().predicate(&already_hit);
            if let Some(exclude) = cast.exclude {
                filter = filter.exclude_rigid_body(exclude);
            }

            let options = ShapeCastOptions::with_max_time_of_impact(cast.max_distance);
            let Some((collider, hit)) = self.query_pipeline.cast_shape(
                &self.rigid_body_set,
                &self.collider_set,
                &shape_pos,
                &shape_vel,
                &shape,
                options,
                filter,
            ) else {
                break;
            };

            if let Some(body) = self.body_of(collider) {
                hits.push(ShapeHit {
                    distance: hit.time_of_impact,
                    body,
                    trigger: self.is_sensor(collider),
                });
            }
            hit_colliders.push(collider);
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }
}
