//! # Barnes–Hut Octree (3D)
//!
//! A Barnes–Hut octree over a slice of [`Body`]s, rebuilt from scratch every
//! step. Nodes live in an arena (`Vec<OctreeNode>`) and refer to their
//! children by index, so ownership is strictly hierarchical with no
//! back-references.
//!
//! ## Core Concepts
//!
//! - Every node covers a cube `[center - half_extent, center + half_extent)`
//!   per axis. Children have exactly half the parent's half extent.
//! - A leaf holds at most one real body (by index into the borrowed slice).
//! - An internal node holds an aggregate pseudo-body: the running
//!   mass-weighted merge of every body inserted below it. Aggregates are
//!   owned by the tree.
//! - Forces walk the tree once per body. A node whose side / distance ratio
//!   drops below `theta` is summarised by its aggregate; otherwise it is
//!   opened and its children are visited.
//!
//! ## Degenerate geometry
//!
//! Two bodies that land in the same leaf while being coincident (or once
//! the leaf has reached `max_depth`) cannot be separated by subdividing.
//! Insertion records a [`Collision`] instead of recursing, and the caller
//! merges the pair before evaluating forces. A coincident leaf met during
//! force evaluation is reported as [`ForceOutcome::Merged`].

use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec3};

const ROOT: usize = 0;

/// One of the eight children of a node.
///
/// Encoded on three bits, one per axis, set when the point lies on the
/// positive side of the node's centre:
///
/// - Bit 0 (value 1): X axis
/// - Bit 1 (value 2): Y axis
/// - Bit 2 (value 4): Z axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Octant(u8);

impl Octant {
    pub const ALL_NEGATIVE: Octant = Octant(0b000);
    pub const ALL_POSITIVE: Octant = Octant(0b111);

    pub fn from_index(index: usize) -> Option<Octant> {
        (index < 8).then_some(Octant(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Unit offset (+1 / -1 per axis) from the parent centre towards this octant.
    pub fn direction(self) -> NVec3 {
        let sign = |bit: u8| if self.0 & bit != 0 { 1.0 } else { -1.0 };
        NVec3::new(sign(1), sign(2), sign(4))
    }
}

/// What a node currently summarises.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Occupant {
    /// A real body, by index into the slice the tree was built over.
    Body(usize),
    /// Synthesised centre of mass of everything below an internal node.
    Aggregate(Body),
}

impl Occupant {
    pub fn body<'a>(&'a self, bodies: &'a [Body]) -> &'a Body {
        match self {
            Occupant::Body(idx) => &bodies[*idx],
            Occupant::Aggregate(aggregate) => aggregate,
        }
    }
}

/// A single octree node: a cube plus its occupant and child links.
#[derive(Debug, Clone)]
pub struct OctreeNode {
    pub center: NVec3,
    pub half_extent: f64,
    pub depth: usize,
    occupant: Option<Occupant>,
    children: [Option<usize>; 8], // indices into Octree::nodes
}

impl OctreeNode {
    pub fn new(center: NVec3, half_extent: f64, depth: usize) -> Self {
        Self {
            center,
            half_extent,
            depth,
            occupant: None,
            children: [None; 8],
        }
    }

    /// Half-open containment on every axis: `center - h <= p < center + h`.
    ///
    /// The closed lower face matches the `>=` tie-break of
    /// [`OctreeNode::classify_octant`]; a point on a node's upper face is
    /// outside it.
    pub fn contains_point(&self, p: &NVec3) -> bool {
        (0..3).all(|axis| {
            let lower = self.center[axis] - self.half_extent;
            let upper = self.center[axis] + self.half_extent;
            p[axis] >= lower && p[axis] < upper
        })
    }

    /// Octant of `p` relative to this node's centre. Ties go to the
    /// positive side on each axis, so the centre itself is `ALL_POSITIVE`.
    pub fn classify_octant(&self, p: &NVec3) -> Octant {
        let mut bits = 0;
        if p.x >= self.center.x { bits |= 1; }
        if p.y >= self.center.y { bits |= 2; }
        if p.z >= self.center.z { bits |= 4; }
        Octant(bits)
    }

    /// Full side length, the `s` of the opening criterion.
    pub fn side_length(&self) -> f64 {
        2.0 * self.half_extent
    }

    pub fn is_external(&self) -> bool {
        self.children.iter().all(|c| c.is_none())
    }

    pub fn occupant(&self) -> Option<&Occupant> {
        self.occupant.as_ref()
    }

    pub fn child(&self, octant: Octant) -> Option<usize> {
        self.children[octant.index()]
    }

    fn child_center(&self, octant: Octant) -> NVec3 {
        self.center + octant.direction() * (self.half_extent / 2.0)
    }
}

/// Result of inserting one body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Placed,
    /// The body lies outside the root cube and was not inserted.
    Outside,
    /// The body met `resident` in a leaf it cannot be separated from.
    Collided { resident: usize },
}

/// A pair of bodies the caller must merge before evaluating forces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub resident: usize,
    pub incoming: usize,
}

/// Result of one force query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForceOutcome {
    /// Every contribution was accumulated into the target.
    Applied,
    /// The target sits on top of body `partner`; `merged` replaces both.
    /// The partner's own contribution was skipped.
    Merged { partner: usize, merged: Body },
}

/// Aggregate state of one occupied node, for inspection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSummary {
    pub depth: usize,
    pub center: NVec3,
    pub half_extent: f64,
    pub mass: f64,
    pub center_of_mass: NVec3,
}

/// A complete octree built over a borrowed body slice.
pub struct Octree<'a> {
    bodies: &'a [Body],
    params: &'a Parameters,
    nodes: Vec<OctreeNode>,
    collisions: Vec<Collision>,
    escaped: usize,
}

impl<'a> Octree<'a> {
    /// An empty tree whose root covers the cube around `center`.
    pub fn new(bodies: &'a [Body], center: NVec3, half_extent: f64, params: &'a Parameters) -> Self {
        Self {
            bodies,
            params,
            nodes: vec![OctreeNode::new(center, half_extent, 0)],
            collisions: Vec::new(),
            escaped: 0,
        }
    }

    /// Build a tree and insert every body of `bodies` in slice order.
    pub fn build(bodies: &'a [Body], center: NVec3, half_extent: f64, params: &'a Parameters) -> Self {
        let mut tree = Self::new(bodies, center, half_extent, params);
        for idx in 0..bodies.len() {
            tree.insert(idx);
        }
        tree
    }

    pub fn root(&self) -> &OctreeNode {
        &self.nodes[ROOT]
    }

    pub fn nodes(&self) -> &[OctreeNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Pairs that could not be separated during insertion.
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Bodies left out because they lie outside the root cube.
    pub fn escaped(&self) -> usize {
        self.escaped
    }

    /// Insert body `body_idx` of the borrowed slice.
    ///
    /// A body outside the root cube is ignored. Children trust octant
    /// classification rather than re-testing containment, so rounding in a
    /// child's bounds can never drop a body that the root accepted.
    pub fn insert(&mut self, body_idx: usize) -> Insertion {
        let position = self.bodies[body_idx].position;
        if !self.nodes[ROOT].contains_point(&position) {
            self.escaped += 1;
            return Insertion::Outside;
        }

        let outcome = self.insert_at(ROOT, body_idx);
        if let Insertion::Collided { resident } = outcome {
            self.collisions.push(Collision {
                resident,
                incoming: body_idx,
            });
        }
        outcome
    }

    /// Recursive insertion:
    ///
    /// 1. An empty node takes the body as its occupant.
    /// 2. A leaf whose real occupant cannot be separated from the body
    ///    (coincident, or depth cap reached) reports a collision.
    /// 3. Otherwise a leaf pushes its real occupant down into the matching
    ///    child, the body descends into its own child (created on demand) and
    ///    the occupant becomes the aggregate of the old occupant and the body.
    fn insert_at(&mut self, node_idx: usize, body_idx: usize) -> Insertion {
        let bodies = self.bodies;
        let incoming = &bodies[body_idx];

        let Some(occupant) = self.nodes[node_idx].occupant else {
            self.nodes[node_idx].occupant = Some(Occupant::Body(body_idx));
            return Insertion::Placed;
        };

        if let Occupant::Body(resident) = occupant {
            let resident_body = &bodies[resident];
            let depth = self.nodes[node_idx].depth;

            if resident_body.is_coincident_with(incoming, self.params.coincidence_eps) {
                return Insertion::Collided { resident };
            }
            if depth >= self.params.max_depth {
                log::warn!(
                    "octree depth cap {} reached, merging bodies {resident} and {body_idx}",
                    self.params.max_depth
                );
                return Insertion::Collided { resident };
            }

            let octant = self.nodes[node_idx].classify_octant(&resident_body.position);
            let child = self.child_or_create(node_idx, octant);
            self.insert_at(child, resident);
        }

        let octant = self.nodes[node_idx].classify_octant(&incoming.position);
        let child = self.child_or_create(node_idx, octant);
        let outcome = self.insert_at(child, body_idx);

        let aggregate = occupant.body(bodies).merge_with(incoming);
        self.nodes[node_idx].occupant = Some(Occupant::Aggregate(aggregate));

        outcome
    }

    fn child_or_create(&mut self, node_idx: usize, octant: Octant) -> usize {
        if let Some(child) = self.nodes[node_idx].child(octant) {
            return child;
        }

        let parent = &self.nodes[node_idx];
        let child = OctreeNode::new(
            parent.child_center(octant),
            parent.half_extent / 2.0,
            parent.depth + 1,
        );

        let child_idx = self.nodes.len();
        self.nodes.push(child);
        self.nodes[node_idx].children[octant.index()] = Some(child_idx);
        child_idx
    }

    /// Accumulate the net tree force on `target` into `target.force`.
    ///
    /// `target` must be field-for-field equal to the body it was built from
    /// (same force included), otherwise its own leaf is not recognised and
    /// is treated as a coincident partner.
    pub fn accumulate_force_on(&self, target: &mut Body) -> ForceOutcome {
        let probe = *target;
        let mut force = NVec3::zeros();
        let mut outcome = ForceOutcome::Applied;

        self.traverse_node(ROOT, &probe, &mut force, &mut outcome);

        target.force += force;
        outcome
    }

    /// Barnes–Hut walk:
    ///
    /// - Empty nodes and the target's own occupant contribute nothing.
    /// - A leaf contributes its body exactly, unless it is coincident with
    ///   the target, in which case the pair is reported for merging.
    /// - An internal node contributes its aggregate when
    ///   `side / distance < theta`, otherwise its children are visited.
    fn traverse_node(&self, node_idx: usize, target: &Body, force: &mut NVec3, outcome: &mut ForceOutcome) {
        let node = &self.nodes[node_idx];

        let Some(occupant) = node.occupant.as_ref() else {
            return;
        };
        let source = occupant.body(self.bodies);
        if source == target {
            return;
        }

        if node.is_external() {
            if source.is_coincident_with(target, self.params.coincidence_eps) {
                if let (Occupant::Body(partner), ForceOutcome::Applied) = (occupant, *outcome) {
                    *outcome = ForceOutcome::Merged {
                        partner: *partner,
                        merged: source.merge_with(target),
                    };
                }
                return;
            }
            *force += target.gravity_from(source, self.params);
            return;
        }

        // distance 0 gives an infinite ratio, which opens the node
        let distance = source.distance_to(target);
        if node.side_length() / distance < self.params.theta {
            *force += target.gravity_from(source, self.params);
        } else {
            for child in node.children.iter().flatten() {
                self.traverse_node(*child, target, force, outcome);
            }
        }
    }

    /// Mass and centre of mass of every occupied node, in arena order.
    pub fn summaries(&self) -> Vec<NodeSummary> {
        self.nodes
            .iter()
            .filter_map(|node| {
                let body = node.occupant.as_ref()?.body(self.bodies);
                Some(NodeSummary {
                    depth: node.depth,
                    center: node.center,
                    half_extent: node.half_extent,
                    mass: body.mass(),
                    center_of_mass: body.position,
                })
            })
            .collect()
    }
}
