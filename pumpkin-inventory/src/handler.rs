use uuid::Uuid;

use crate::{
    container_click::ClickKind, container_type::ContainerType, host::OpenedContainer,
    item::ItemStack, HandlerError,
};

/// A viewer clicked a slot of the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub viewer: Uuid,
    pub slot_index: usize,
    pub kind: ClickKind,
    pub container_type: ContainerType,
    /// The stack in the clicked slot when the click arrived.
    pub stack: ItemStack,
}

/// A not yet committed change of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeProposal {
    pub viewer: Uuid,
    pub slot_index: usize,
    pub previous: ItemStack,
    pub proposed: ItemStack,
}

/// A slot change requested by a click handler. It is turned into a [`ChangeProposal`] and
/// judged by the change handlers like any other change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotChange {
    pub slot_index: usize,
    pub stack: ItemStack,
}

/// What a click handler wants to happen after it ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    cancelled: bool,
    changes: Vec<SlotChange>,
}

impl ClickOutcome {
    /// Let the click through.
    pub fn pass() -> Self {
        Self::default()
    }

    /// Suppress the default behaviour of the click. The clicked slot is resent to the viewer.
    pub fn cancel() -> Self {
        Self {
            cancelled: true,
            changes: Vec::new(),
        }
    }

    pub fn and_set(mut self, slot_index: usize, stack: ItemStack) -> Self {
        self.changes.push(SlotChange { slot_index, stack });
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn changes(&self) -> &[SlotChange] {
        &self.changes
    }

    pub(crate) fn into_parts(self) -> (bool, Vec<SlotChange>) {
        (self.cancelled, self.changes)
    }
}

pub trait ClickHandler: Send + Sync {
    fn on_click(&self, event: &ClickEvent) -> Result<ClickOutcome, HandlerError>;
}

impl<F> ClickHandler for F
where
    F: Fn(&ClickEvent) -> Result<ClickOutcome, HandlerError> + Send + Sync,
{
    fn on_click(&self, event: &ClickEvent) -> Result<ClickOutcome, HandlerError> {
        self(event)
    }
}

/// Decides whether a proposed change may be committed. Returning `Ok(false)` rejects it.
pub trait ChangeHandler: Send + Sync {
    fn on_change(&self, proposal: &ChangeProposal) -> Result<bool, HandlerError>;
}

impl<F> ChangeHandler for F
where
    F: Fn(&ChangeProposal) -> Result<bool, HandlerError> + Send + Sync,
{
    fn on_change(&self, proposal: &ChangeProposal) -> Result<bool, HandlerError> {
        self(proposal)
    }
}

pub trait CloseHandler: Send + Sync {
    fn on_close(&self, container: &OpenedContainer, viewer: Uuid) -> Result<(), HandlerError>;
}

impl<F> CloseHandler for F
where
    F: Fn(&OpenedContainer, Uuid) -> Result<(), HandlerError> + Send + Sync,
{
    fn on_close(&self, container: &OpenedContainer, viewer: Uuid) -> Result<(), HandlerError> {
        self(container, viewer)
    }
}

/// Rejects every change. Backs read-only slot ranges.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnlyHandler;

impl ChangeHandler for ReadOnlyHandler {
    fn on_change(&self, _proposal: &ChangeProposal) -> Result<bool, HandlerError> {
        Ok(false)
    }
}
