use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Vec2, vec2};

use crate::data::GraphSnapshot;
use crate::util::stable_unit;

const PRIMARY_MIN_RADIUS: f32 = 180.0;
const PRIMARY_RADIUS_PER_NODE: f32 = 12.0;
const DOCUMENT_RING_OFFSET: f32 = 120.0;
const MAX_SPEED: f32 = 26.0;
const MIN_SLEEP_SPEED: f32 = 0.035;

/// Tuned simulation constants. These are configuration defaults, not
/// contracts; the control panel exposes the interesting ones as sliders.
#[derive(Clone, Copy, Debug)]
pub struct SimulationParams {
    pub repulsion: f32,
    pub hub_repulsion: f32,
    pub repulsion_cutoff: f32,
    pub link_distance: f32,
    pub link_strength: f32,
    pub center_pull: f32,
    pub velocity_decay: f32,
    pub tick_budget: u32,
    pub reheat_budget: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            repulsion: 2_600.0,
            hub_repulsion: 5_200.0,
            repulsion_cutoff: 420.0,
            link_distance: 90.0,
            link_strength: 0.028,
            center_pull: 0.0016,
            velocity_decay: 0.88,
            tick_budget: 300,
            reheat_budget: 90,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick budget exhausted earlier; nothing moved.
    Idle,
    Moving,
    /// The simulation just came to rest. Reported exactly once per
    /// snapshot (or reheat) so the camera can auto-fit.
    Settled,
}

/// Owns every write to node positions and pins. Constructed once per view
/// and re-primed for each snapshot; the renderer only ever reads.
pub struct LayoutEngine {
    pub params: SimulationParams,
    hub_mode: bool,
    ticks_remaining: u32,
    settled_reported: bool,
    scratch_forces: Vec<Vec2>,
}

impl LayoutEngine {
    pub fn new(params: SimulationParams) -> Self {
        Self {
            params,
            hub_mode: false,
            ticks_remaining: 0,
            settled_reported: true,
            scratch_forces: Vec::new(),
        }
    }

    pub fn hub_mode(&self) -> bool {
        self.hub_mode
    }

    /// Radial pre-positioning, run once per new snapshot before any tick.
    pub fn prime(&mut self, snapshot: &mut GraphSnapshot) {
        self.hub_mode = snapshot.center_index.is_some();
        self.ticks_remaining = self.params.tick_budget;
        self.settled_reported = snapshot.is_empty();
        self.scratch_forces.clear();

        for node in &mut snapshot.nodes {
            node.velocity = Vec2::ZERO;
            node.pin = None;
        }

        let center_index = snapshot.center_index;
        let primary_indices = snapshot
            .nodes
            .iter()
            .enumerate()
            .filter(|(index, node)| node.kind.is_primary() && Some(*index) != center_index)
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        let ring_radius =
            PRIMARY_MIN_RADIUS.max(PRIMARY_RADIUS_PER_NODE * primary_indices.len() as f32);

        for (ordinal, &index) in primary_indices.iter().enumerate() {
            let angle =
                TAU * ordinal as f32 / primary_indices.len() as f32 - FRAC_PI_2;
            let pos = vec2(angle.cos(), angle.sin()) * ring_radius;
            let node = &mut snapshot.nodes[index];
            node.pos = pos;
            node.pin = Some(pos);
        }

        if let Some(center) = center_index {
            let node = &mut snapshot.nodes[center];
            node.pos = Vec2::ZERO;
            node.pin = Some(Vec2::ZERO);
        }

        if self.hub_mode {
            let filing_indices = snapshot
                .nodes
                .iter()
                .enumerate()
                .filter(|(_, node)| node.kind.is_filing())
                .map(|(index, _)| index)
                .collect::<Vec<_>>();
            let document_radius = ring_radius + DOCUMENT_RING_OFFSET;

            for (ordinal, &index) in filing_indices.iter().enumerate() {
                let angle =
                    TAU * ordinal as f32 / filing_indices.len() as f32 - FRAC_PI_2;
                let node = &mut snapshot.nodes[index];
                node.pos = vec2(angle.cos(), angle.sin()) * document_radius;
            }
        }

        self.scatter_disk(snapshot, ring_radius * 0.5);
    }

    /// Uniform-area disk sampling for every node no ring has claimed,
    /// driven by a per-id hash so rebuilds land nodes where they were.
    fn scatter_disk(&self, snapshot: &mut GraphSnapshot, disk_radius: f32) {
        let hub_mode = self.hub_mode;
        let loose = snapshot
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| {
                !node.is_pinned() && !(hub_mode && node.kind.is_filing())
            })
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        let count = loose.len().max(1);
        for (ordinal, &index) in loose.iter().enumerate() {
            let node = &mut snapshot.nodes[index];
            let radius = disk_radius * stable_unit(&node.id).sqrt();
            let angle = TAU * ordinal as f32 / count as f32;
            node.pos = vec2(angle.cos(), angle.sin()) * radius;
        }
    }

    /// One bounded integration step. Never moves a pinned node.
    pub fn tick(&mut self, snapshot: &mut GraphSnapshot) -> TickOutcome {
        if self.ticks_remaining == 0 || snapshot.node_count() < 2 {
            return self.finish();
        }
        self.ticks_remaining -= 1;

        let node_count = snapshot.node_count();
        let forces = &mut self.scratch_forces;
        forces.resize(node_count, Vec2::ZERO);
        forces.fill(Vec2::ZERO);

        let repulsion = if self.hub_mode {
            self.params.hub_repulsion
        } else {
            self.params.repulsion
        };
        let cutoff_sq = self.params.repulsion_cutoff * self.params.repulsion_cutoff;

        for i in 0..node_count {
            for j in (i + 1)..node_count {
                let delta = snapshot.nodes[i].pos - snapshot.nodes[j].pos;
                let distance_sq = delta.length_sq();
                if distance_sq > cutoff_sq {
                    continue;
                }

                let distance = distance_sq.sqrt().max(0.5);
                let push = (delta / distance) * (repulsion / (distance * distance));
                forces[i] += push;
                forces[j] -= push;
            }
        }

        for link in &snapshot.links {
            let delta = snapshot.nodes[link.source].pos - snapshot.nodes[link.target].pos;
            let distance = delta.length().max(0.5);
            let direction = delta / distance;
            let pull = direction * ((distance - self.params.link_distance) * self.params.link_strength);

            forces[link.source] -= pull;
            forces[link.target] += pull;
        }

        for (index, force) in forces.iter_mut().enumerate() {
            *force -= snapshot.nodes[index].pos * self.params.center_pull;
        }

        let mut any_motion = false;
        for (index, node) in snapshot.nodes.iter_mut().enumerate() {
            if let Some(pin) = node.pin {
                node.pos = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }

            let mut velocity = (node.velocity + forces[index]) * self.params.velocity_decay;
            let speed = velocity.length();
            if speed > MAX_SPEED {
                velocity *= MAX_SPEED / speed;
            }
            if velocity.length() < MIN_SLEEP_SPEED {
                velocity = Vec2::ZERO;
            }

            node.velocity = velocity;
            node.pos += velocity;
            if velocity != Vec2::ZERO {
                any_motion = true;
            }
        }

        if !any_motion {
            self.ticks_remaining = 0;
            return self.finish();
        }

        TickOutcome::Moving
    }

    fn finish(&mut self) -> TickOutcome {
        self.ticks_remaining = 0;
        if self.settled_reported {
            TickOutcome::Idle
        } else {
            self.settled_reported = true;
            TickOutcome::Settled
        }
    }

    /// Outside hub mode, taxpayers sit frozen on their ring. Once other
    /// kinds share the canvas the ring reads as an artifact, so release
    /// the pins and grant a bounded extra tick budget instead of a full
    /// re-prime.
    pub fn release_primary_ring(&mut self, snapshot: &mut GraphSnapshot) -> bool {
        if self.hub_mode {
            return false;
        }

        let mut released = false;
        for node in &mut snapshot.nodes {
            if node.kind.is_primary() && node.is_pinned() {
                node.pin = None;
                released = true;
            }
        }

        if released {
            self.ticks_remaining = self.ticks_remaining.max(self.params.reheat_budget);
            self.settled_reported = false;
        }

        released
    }
}
