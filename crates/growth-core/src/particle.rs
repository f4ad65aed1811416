use std::fmt;

use glam::Vec3;

/// Stable particle identity, assigned once at creation and never reused
/// within one system lifetime. Not a storage index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u32);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which behaviour family a system is filled with.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ParticleKind {
    Linked = b'L',   // Cohesive cell division over an icosahedron
    Growth = b'G',   // Branching growth toward the light
    Automata = b'A', // 3D Game of Life
}

impl ParticleKind {
    /// Parse the single-letter tag used by the UI (`L`, `G`, `A`).
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag.to_ascii_uppercase() {
            b'L' => Some(Self::Linked),
            b'G' => Some(Self::Growth),
            b'A' => Some(Self::Automata),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkedState {
    pub food_level: u32,
    pub food_threshold: u32,
    /// Ticks survived while particle death is enabled.
    pub life: u32,
    /// `Some(n)` while the particle is digesting food, `n` ticks in.
    pub feeding: Option<u32>,
}

impl LinkedState {
    pub fn new(food_threshold: u32) -> Self {
        Self {
            food_level: 0,
            food_threshold,
            life: 0,
            feeding: None,
        }
    }

    pub fn is_ready_to_split(&self) -> bool {
        self.food_level >= self.food_threshold
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GrowthState {
    /// `None` for the root of a tree.
    pub parent: Option<ParticleId>,
    pub child_threshold: u32,
    pub branch_length: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AutomataState {
    pub alive: bool,
    /// Ticks since the last birth attempt.
    pub timer: u32,
}

impl Default for AutomataState {
    fn default() -> Self {
        Self {
            alive: true,
            timer: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum VariantState {
    Linked(LinkedState),
    Growth(GrowthState),
    Automata(AutomataState),
}

impl VariantState {
    pub fn kind(&self) -> ParticleKind {
        match self {
            VariantState::Linked(_) => ParticleKind::Linked,
            VariantState::Growth(_) => ParticleKind::Growth,
            VariantState::Automata(_) => ParticleKind::Automata,
        }
    }
}

/// A single simulated node: cell, branch tip or automaton cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    id: ParticleId,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Radius.
    pub size: f32,
    connections: Vec<ParticleId>,
    pub state: VariantState,
}

impl Particle {
    pub fn new(
        id: ParticleId,
        position: Vec3,
        size: f32,
        connections: Vec<ParticleId>,
        state: VariantState,
    ) -> Self {
        let mut particle = Self {
            id,
            position,
            velocity: Vec3::ZERO,
            size,
            connections: Vec::with_capacity(connections.len()),
            state,
        };
        for other in connections {
            particle.connect(other);
        }
        particle
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn kind(&self) -> ParticleKind {
        self.state.kind()
    }

    /// `position += velocity`, no clamping.
    pub fn advance(&mut self) {
        self.position += self.velocity;
    }

    /// Add a one-sided edge. Duplicates and self-edges are ignored.
    ///
    /// Symmetry is the caller's job; see [`crate::store::ParticleStore::double_connect`].
    pub fn connect(&mut self, other: ParticleId) {
        if other != self.id && !self.connections.contains(&other) {
            self.connections.push(other);
        }
    }

    /// Remove a one-sided edge. No-op if absent.
    pub fn delete_connection(&mut self, other: ParticleId) {
        self.connections.retain(|&c| c != other);
    }

    pub fn connections(&self) -> &[ParticleId] {
        &self.connections
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_connected_to(&self, other: ParticleId) -> bool {
        self.connections.contains(&other)
    }

    pub(crate) fn replace_connections(&mut self, connections: Vec<ParticleId>) {
        self.connections.clear();
        for other in connections {
            self.connect(other);
        }
    }

    /// Automata report their rule state; every other variant is always alive.
    pub fn is_alive(&self) -> bool {
        match &self.state {
            VariantState::Automata(a) => a.alive,
            _ => true,
        }
    }

    pub fn as_linked(&self) -> Option<&LinkedState> {
        match &self.state {
            VariantState::Linked(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_linked_mut(&mut self) -> Option<&mut LinkedState> {
        match &mut self.state {
            VariantState::Linked(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_growth(&self) -> Option<&GrowthState> {
        match &self.state {
            VariantState::Growth(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_growth_mut(&mut self) -> Option<&mut GrowthState> {
        match &mut self.state {
            VariantState::Growth(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_automata(&self) -> Option<&AutomataState> {
        match &self.state {
            VariantState::Automata(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_automata_mut(&mut self) -> Option<&mut AutomataState> {
        match &mut self.state {
            VariantState::Automata(s) => Some(s),
            _ => None,
        }
    }
}
