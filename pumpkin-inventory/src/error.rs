use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Invalid slot index {index}, the inventory has {size} slots")]
    InvalidSlotIndex { index: usize, size: usize },

    #[error("Menu is already open")]
    AlreadyOpen,

    #[error("Menu session has already been closed")]
    SessionClosed,

    #[error("Menu is not open")]
    NotOpen,

    #[error("Viewer {0} is not viewing this menu")]
    UnknownViewer(Uuid),

    #[error("Client view is out of sync: {0}")]
    DesyncDetected(Desync),

    #[error("Invalid click")]
    InvalidClick,
}

/// How an inbound event showed that the viewer displays something else than the menu.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Desync {
    #[error("slot {slot} is outside the menu layout ({size} slots)")]
    SlotOutOfLayout { slot: usize, size: usize },

    #[error("event came from window {sync_id}, but window {current} is open")]
    StaleWindow { sync_id: u8, current: u8 },
}

/// A failure raised by a plugin supplied handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),

    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
