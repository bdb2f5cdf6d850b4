//! HUD text slots
//!
//! The HUD is three named text slots in the host document. A slot that is
//! missing at update time is skipped without error.

use tracing::trace;

use super::stats::StatsSnapshot;

/// Named HUD slot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HudSlot {
    Packets,
    Bandwidth,
    Nodes,
}

impl HudSlot {
    pub const ALL: &'static [HudSlot] = &[HudSlot::Packets, HudSlot::Bandwidth, HudSlot::Nodes];

    /// Element id of the slot in the host document
    pub fn id(self) -> &'static str {
        match self {
            HudSlot::Packets => "packets",
            HudSlot::Bandwidth => "bandwidth",
            HudSlot::Nodes => "nodes",
        }
    }

    /// Text shown in this slot for a snapshot
    pub fn format(self, stats: &StatsSnapshot) -> String {
        match self {
            HudSlot::Packets => stats.packets.to_string(),
            HudSlot::Bandwidth => format!("{:.1}", stats.bandwidth),
            HudSlot::Nodes => stats.nodes.to_string(),
        }
    }
}

/// Destination for HUD text, looked up by slot id
pub trait TextSlots {
    /// Set the text of slot `id`. Returns false if the slot does not exist.
    fn set_text(&mut self, id: &str, text: &str) -> bool;
}

/// Write all HUD slots from `stats`. Returns how many slots were present.
pub fn refresh_hud<T: TextSlots + ?Sized>(stats: &StatsSnapshot, slots: &mut T) -> usize {
    let mut written = 0;
    for &slot in HudSlot::ALL {
        if slots.set_text(slot.id(), &slot.format(stats)) {
            written += 1;
        } else {
            trace!(slot = slot.id(), "hud slot missing, skipped");
        }
    }
    written
}
