//! Graphics resource bookkeeping
//!
//! Every geometry buffer, material and output surface the scene creates is
//! registered here and must be released explicitly. Nothing is reclaimed
//! automatically, so teardown can assert that the live set is empty.

use std::collections::HashMap;
use tracing::{debug, trace};

/// Kind of graphics resource tracked by the registry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Surface,
    NodeGeometry,
    NodeMaterial,
    ConnectionGeometry,
    ConnectionMaterial,
    PacketGeometry,
    PacketMaterial,
}

impl ResourceKind {
    pub const ALL: &'static [ResourceKind] = &[
        ResourceKind::Surface,
        ResourceKind::NodeGeometry,
        ResourceKind::NodeMaterial,
        ResourceKind::ConnectionGeometry,
        ResourceKind::ConnectionMaterial,
        ResourceKind::PacketGeometry,
        ResourceKind::PacketMaterial,
    ];

    #[inline]
    fn idx(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Surface => "surface",
            ResourceKind::NodeGeometry => "node_geometry",
            ResourceKind::NodeMaterial => "node_material",
            ResourceKind::ConnectionGeometry => "connection_geometry",
            ResourceKind::ConnectionMaterial => "connection_material",
            ResourceKind::PacketGeometry => "packet_geometry",
            ResourceKind::PacketMaterial => "packet_material",
        }
    }
}

const NUM_KINDS: usize = 7;

/// Handle to a registered resource. Copyable; owning it does not keep the
/// resource alive, only the registry entry does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResourceId {
    raw: u64,
    kind: ResourceKind,
}

impl ResourceId {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

/// Registry of live graphics resources with per-kind counters
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    next_id: u64,
    live: HashMap<u64, ResourceKind>,
    allocated: [u64; NUM_KINDS],
    released: [u64; NUM_KINDS],
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new resource of `kind`
    pub fn allocate(&mut self, kind: ResourceKind) -> ResourceId {
        let raw = self.next_id;
        self.next_id += 1;
        self.live.insert(raw, kind);
        self.allocated[kind.idx()] += 1;
        trace!(raw, kind = kind.label(), "resource allocated");
        ResourceId { raw, kind }
    }

    /// Release a resource. Returns false (and does nothing) if it was never
    /// allocated here or has already been released.
    pub fn release(&mut self, id: ResourceId) -> bool {
        match self.live.remove(&id.raw) {
            Some(kind) => {
                self.released[kind.idx()] += 1;
                trace!(raw = id.raw, kind = kind.label(), "resource released");
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_live(&self, id: ResourceId) -> bool {
        self.live.contains_key(&id.raw)
    }

    /// Number of live resources across all kinds
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of live resources of one kind
    pub fn live_of(&self, kind: ResourceKind) -> usize {
        self.live.values().filter(|&&k| k == kind).count()
    }

    pub fn allocated_of(&self, kind: ResourceKind) -> u64 {
        self.allocated[kind.idx()]
    }

    pub fn released_of(&self, kind: ResourceKind) -> u64 {
        self.released[kind.idx()]
    }

    /// Release everything still live. Returns how many entries were swept.
    pub fn release_all(&mut self) -> usize {
        let swept = self.live.len();
        for (_, kind) in self.live.drain() {
            self.released[kind.idx()] += 1;
        }
        if swept > 0 {
            debug!(swept, "released remaining resources");
        }
        swept
    }
}
