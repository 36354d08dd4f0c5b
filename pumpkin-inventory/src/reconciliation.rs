use std::collections::BTreeSet;

use log::{debug, warn};
use pumpkin_config::SyncConfig;

use crate::{error::Desync, item::ItemStack, MenuError};

/// What the viewer is believed to display in one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedStack {
    pub received_stack: Option<ItemStack>,
}

impl TrackedStack {
    pub const UNKNOWN: TrackedStack = TrackedStack {
        received_stack: None,
    };

    pub fn set_received_stack(&mut self, stack: ItemStack) {
        self.received_stack = Some(stack);
    }

    /// The viewer may have predicted anything; the slot must be resent.
    pub fn invalidate(&mut self) {
        self.received_stack = None;
    }

    pub fn is_in_sync(&self, actual_stack: &ItemStack) -> bool {
        self.received_stack
            .is_some_and(|stack| stack.are_equal(actual_stack))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotUpdate {
    pub slot_index: usize,
    pub stack: ItemStack,
}

/// Updates to send to a viewer, tagged with the state revision they bring the viewer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotDiff {
    Partial {
        revision: u32,
        updates: Vec<SlotUpdate>,
    },
    Full {
        revision: u32,
        stacks: Vec<ItemStack>,
    },
}

impl SlotDiff {
    pub fn revision(&self) -> u32 {
        match self {
            Self::Partial { revision, .. } | Self::Full { revision, .. } => *revision,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full { .. })
    }

    /// The per slot updates of a partial diff, or every slot of a full one.
    pub fn updates(&self) -> Vec<SlotUpdate> {
        match self {
            Self::Partial { updates, .. } => updates.clone(),
            Self::Full { stacks, .. } => stacks
                .iter()
                .enumerate()
                .map(|(slot_index, stack)| SlotUpdate {
                    slot_index,
                    stack: *stack,
                })
                .collect(),
        }
    }
}

/// Keeps one viewer's picture of a menu consistent with the authoritative inventory.
///
/// The engine never touches the inventory itself. Callers hand it the authoritative contents
/// when a diff should be computed, after releasing the inventory's mutation lock.
#[derive(Debug)]
pub struct ReconciliationEngine {
    tracked_stacks: Vec<TrackedStack>,
    dirty: BTreeSet<usize>,
    full_resync: bool,
    revision: u32,
    full_resync_ratio: f32,
}

impl ReconciliationEngine {
    pub fn new(size: usize, config: &SyncConfig) -> Self {
        Self {
            tracked_stacks: vec![TrackedStack::UNKNOWN; size],
            dirty: BTreeSet::new(),
            full_resync: false,
            revision: 0,
            full_resync_ratio: config.full_resync_ratio,
        }
    }

    pub fn size(&self) -> usize {
        self.tracked_stacks.len()
    }

    /// The viewer was just sent `stacks` as the whole content, e.g. when its window opened.
    pub fn reset(&mut self, stacks: &[ItemStack]) {
        self.tracked_stacks = stacks
            .iter()
            .map(|stack| TrackedStack {
                received_stack: Some(*stack),
            })
            .collect();
        self.dirty.clear();
        self.full_resync = false;
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn next_revision(&mut self) -> u32 {
        self.revision = (self.revision + 1) & 32767;
        self.revision
    }

    /// Checks that the viewer addresses a slot of the current layout.
    pub fn check_slot(&self, slot: usize) -> Result<(), MenuError> {
        if slot < self.size() {
            Ok(())
        } else {
            Err(MenuError::DesyncDetected(Desync::SlotOutOfLayout {
                slot,
                size: self.size(),
            }))
        }
    }

    pub fn mark_dirty(&mut self, slot: usize) {
        if slot < self.size() {
            self.dirty.insert(slot);
        }
    }

    pub fn is_dirty(&self, slot: usize) -> bool {
        self.dirty.contains(&slot)
    }

    pub fn dirty_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.dirty.iter().copied()
    }

    /// A change was committed. The viewer is assumed to already show `committed`.
    pub fn on_accepted(&mut self, slot: usize, committed: ItemStack) {
        if let Some(tracked) = self.tracked_stacks.get_mut(slot) {
            tracked.set_received_stack(committed);
            self.dirty.insert(slot);
        }
    }

    /// A change was refused. The viewer may have applied it locally, so the slot is resent.
    pub fn on_rejected(&mut self, slot: usize) {
        if let Some(tracked) = self.tracked_stacks.get_mut(slot) {
            tracked.invalidate();
            self.dirty.insert(slot);
        }
    }

    /// Marks every slot whose authoritative stack differs from the viewer's picture. This picks
    /// up commits done by other sessions sharing the inventory.
    pub fn detect_changes(&mut self, authoritative: &[ItemStack]) {
        for (slot, (tracked, actual)) in self
            .tracked_stacks
            .iter()
            .zip(authoritative.iter())
            .enumerate()
        {
            if !tracked.is_in_sync(actual) {
                self.dirty.insert(slot);
            }
        }
    }

    pub fn request_full_resync(&mut self) {
        self.full_resync = true;
    }

    pub fn is_full_resync_pending(&self) -> bool {
        self.full_resync
    }

    /// Computes the updates the viewer needs and clears the dirty set.
    ///
    /// Only dirty slots that the viewer doesn't already show correctly are included, each at most
    /// once and with its current authoritative stack. Returns `None` when nothing has to be sent.
    pub fn compute_diff(&mut self, authoritative: &[ItemStack]) -> Option<SlotDiff> {
        if authoritative.len() != self.size() {
            warn!(
                "Inventory has {} slots but the viewer tracks {}, resending everything",
                authoritative.len(),
                self.size()
            );
            self.tracked_stacks = vec![TrackedStack::UNKNOWN; authoritative.len()];
            self.full_resync = true;
        }

        if self.full_resync {
            return Some(self.full_diff(authoritative));
        }

        let dirty = std::mem::take(&mut self.dirty);
        let updates: Vec<SlotUpdate> = dirty
            .into_iter()
            .filter(|slot| !self.tracked_stacks[*slot].is_in_sync(&authoritative[*slot]))
            .map(|slot| SlotUpdate {
                slot_index: slot,
                stack: authoritative[slot],
            })
            .collect();

        if updates.is_empty() {
            return None;
        }

        if self.full_resync_ratio < 1.0
            && updates.len() as f32 > self.full_resync_ratio * self.size() as f32
        {
            debug!(
                "{} of {} slots out of sync, sending the full content",
                updates.len(),
                self.size()
            );
            return Some(self.full_diff(authoritative));
        }

        for update in &updates {
            self.tracked_stacks[update.slot_index].set_received_stack(update.stack);
        }

        Some(SlotDiff::Partial {
            revision: self.next_revision(),
            updates,
        })
    }

    fn full_diff(&mut self, authoritative: &[ItemStack]) -> SlotDiff {
        self.reset(authoritative);
        SlotDiff::Full {
            revision: self.next_revision(),
            stacks: authoritative.to_vec(),
        }
    }
}
