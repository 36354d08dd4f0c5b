use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    container_type::ContainerType, item::ItemStack, reconciliation::SlotDiff, HandlerError,
};

/// A menu window as the session layer opened it for one viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenedContainer {
    pub sync_id: u8,
    pub container_type: ContainerType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerPhase {
    Click,
    Change,
    Close,
}

/// Where a handler failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureContext {
    pub phase: HandlerPhase,
    pub viewer: Option<Uuid>,
    pub slot_index: Option<usize>,
}

/// The game server side of a menu: renders windows and owns the connection to the viewer.
///
/// Implementations should only queue work here; the menu session awaits every call while it
/// processes an event.
#[async_trait]
pub trait MenuHost: Send + Sync {
    /// Opens a window for `viewer`. Returns `None` if the viewer can't see menus right now.
    async fn request_open(
        &self,
        viewer: Uuid,
        container_type: ContainerType,
        stacks: &[ItemStack],
        title: &str,
    ) -> Option<OpenedContainer>;

    async fn request_close(&self, viewer: Uuid, container: &OpenedContainer);

    async fn push_slot_diff(&self, viewer: Uuid, container: &OpenedContainer, diff: &SlotDiff);

    async fn report_handler_failure(&self, context: &FailureContext, error: &HandlerError);
}
