//! Synchronous, same-stack typed pub/sub.
//!
//! spec.md §5 requires handlers to run on the emitter's own stack, in
//! subscription order, with subscribe/unsubscribe permitted around emission.
//! Bevy's own `Events<T>`/`MessageWriter` double-buffers delivery to the next
//! schedule pass, which is exactly the semantics spec.md rules out, so this
//! is a small hand-rolled bus instead — the direct replacement for the
//! duck-typed global emitter spec.md §9's redesign notes call out.

use glam::DVec2;

use crate::rocket::ThrusterId;

/// Per-body pose entry in a [`SimulationSnapshot`], one per celestial body
/// (spec.md §3/§6: "array of celestial poses").
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPose {
    pub name: String,
    pub position: DVec2,
    pub radius: f64,
    pub mass: f64,
}

/// Everything spec.md §3 lists for the emitted snapshot: rocket pose plus
/// resources and surface state, the celestial poses array, the vector
/// annotations the Physics Controller computes each tick (§4.1 step 9), and
/// an opaque mission-view slot (mission bookkeeping itself is an external
/// collaborator per spec.md §1).
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSnapshot {
    pub rocket_position: DVec2,
    pub rocket_velocity: DVec2,
    pub rocket_angle: f64,
    pub rocket_angular_velocity: f64,
    pub fuel: f64,
    pub health: f64,
    pub is_destroyed: bool,
    pub is_landed: bool,
    pub landed_on: Option<String>,
    pub bodies: Vec<BodyPose>,
    pub gravity: DVec2,
    pub total_thrust: DVec2,
    pub acceleration: DVec2,
    pub mission_view: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    ThrusterPowerSet { id: ThrusterId, power: f64 },
    RotationCommand { value: f64 },
    RocketReset,
    GameTogglePause { paused: bool },
    SimulationUpdated { snapshot: SimulationSnapshot },
    RocketLanded { body: String },
    RocketDestroyed { position: DVec2 },
    MissionCompleted { mission_id: String },
    CreditsUpdated { reward: f64 },
    EpisodeStarted,
    EpisodeEnded { reward: f64 },
    TrainingStep { step: u64, reward: f64 },
}

type Handler = Box<dyn FnMut(&SimEvent)>;

/// Slot-based subscriber list: unsubscribing during emission clears a slot
/// in place (skipped for the rest of the current `emit`), and subscribing
/// during emission appends past the snapshot length (takes effect starting
/// with the next `emit` call), matching spec.md's ordering guarantee without
/// needing interior mutability for reentrant handlers.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Option<Handler>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(usize);

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: Handler) -> SubscriptionId {
        self.subscribers.push(Some(handler));
        SubscriptionId(self.subscribers.len() - 1)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        if let Some(slot) = self.subscribers.get_mut(id.0) {
            *slot = None;
        }
    }

    pub fn emit(&mut self, event: SimEvent) {
        let len = self.subscribers.len();
        for i in 0..len {
            if let Some(mut handler) = self.subscribers[i].take() {
                handler(&event);
                self.subscribers[i] = Some(handler);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.iter().filter(|s| s.is_some()).count()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
