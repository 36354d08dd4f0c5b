use log::{debug, warn};
use tokio::{sync::mpsc, task::JoinHandle};
use uuid::Uuid;

use crate::{
    container_click::{Click, ClickKind, ClickTarget},
    item::ItemStack,
    menu::{MenuSession, SessionState},
    MenuError,
};

/// Work for a session, queued from the network or from game logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    Click {
        viewer: Uuid,
        /// The window the click was made in.
        sync_id: u8,
        slot: usize,
        kind: ClickKind,
    },
    ChangeAttempt {
        viewer: Uuid,
        sync_id: u8,
        slot: usize,
        proposed: ItemStack,
    },
    ViewerDisconnected {
        viewer: Uuid,
    },
    SetSlot {
        slot: usize,
        stack: ItemStack,
    },
    SetTitle(String),
    SetReadOnly(bool),
    Flush,
    Close,
}

impl MenuEvent {
    /// Turns a decoded click into an event. Clicks outside the window don't target a slot of the
    /// menu and give `None`.
    pub fn from_click(viewer: Uuid, sync_id: u8, click: Click) -> Option<Self> {
        match click.slot {
            ClickTarget::Slot(slot) => Some(Self::Click {
                viewer,
                sync_id,
                slot,
                kind: click.kind,
            }),
            ClickTarget::OutsideInventory => None,
        }
    }
}

/// Runs a session on its own task so events are handled one at a time, in arrival order.
pub struct SessionDriver {
    sender: mpsc::Sender<MenuEvent>,
    task: JoinHandle<MenuSession>,
}

impl SessionDriver {
    pub fn spawn(mut session: MenuSession, queue_size: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel(queue_size.max(1));

        let task = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                if let Err(err) = session.handle_event(event).await {
                    warn!("Failed to handle menu event: {err}");
                }
                if session.state() == SessionState::Closed {
                    debug!("Menu session closed, stopping its driver");
                    break;
                }
            }
            session
        });

        Self { sender, task }
    }

    /// Queues an event, waiting for room if the queue is full.
    pub async fn send(&self, event: MenuEvent) -> Result<(), MenuError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| MenuError::SessionClosed)
    }

    pub fn sender(&self) -> mpsc::Sender<MenuEvent> {
        self.sender.clone()
    }

    /// Stops accepting events and waits until the queued ones are handled. Returns the session,
    /// or `None` if its task panicked.
    pub async fn shutdown(self) -> Option<MenuSession> {
        drop(self.sender);
        match self.task.await {
            Ok(session) => Some(session),
            Err(err) => {
                warn!("Menu session task failed: {err}");
                None
            }
        }
    }
}
