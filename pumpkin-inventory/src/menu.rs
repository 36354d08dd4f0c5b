use std::sync::Arc;

use log::{debug, warn};
use pumpkin_config::{MenuConfig, SyncConfig};
use uuid::Uuid;

use crate::{
    container_click::ClickKind,
    container_type::ContainerType,
    dispatcher::{ChangeDecision, ClickDecision, EventDispatcher},
    driver::MenuEvent,
    handler::{
        ChangeHandler, ChangeProposal, ClickEvent, ClickHandler, CloseHandler, ReadOnlyHandler,
    },
    host::{FailureContext, HandlerPhase, MenuHost, OpenedContainer},
    inventory::MenuInventory,
    item::ItemStack,
    reconciliation::{ReconciliationEngine, SlotDiff},
    slot_registry::{RegistrationId, SlotRegistry},
    Desync, HandlerError, MenuError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not opened yet.
    Created,
    Open,
    /// Closed for good; a session can't be reopened.
    Closed,
}

/// One menu shown to one viewer.
///
/// A session owns its handler registrations and its view of what the viewer displays. The
/// inventory can be shared with other sessions. Every method takes `&mut self`, so a session
/// handles one event to completion before the next one; share it behind a
/// `tokio::sync::Mutex` or hand it to a [`SessionDriver`](crate::driver::SessionDriver).
pub struct MenuSession {
    host: Arc<dyn MenuHost>,
    inventory: Arc<MenuInventory>,
    title: String,
    read_only: bool,
    registry: SlotRegistry,
    dispatcher: EventDispatcher,
    reconciliation: ReconciliationEngine,
    sync_config: SyncConfig,
    close_handlers: Vec<Arc<dyn CloseHandler>>,
    state: SessionState,
    viewer: Option<Uuid>,
    container: Option<OpenedContainer>,
}

impl MenuSession {
    pub fn new(
        host: Arc<dyn MenuHost>,
        inventory: Arc<MenuInventory>,
        title: impl Into<String>,
    ) -> Self {
        Self::with_config(host, inventory, title, &MenuConfig::default())
    }

    pub fn with_config(
        host: Arc<dyn MenuHost>,
        inventory: Arc<MenuInventory>,
        title: impl Into<String>,
        config: &MenuConfig,
    ) -> Self {
        let reconciliation = ReconciliationEngine::new(inventory.size(), &config.sync);
        Self {
            host,
            inventory,
            title: title.into(),
            read_only: true,
            registry: SlotRegistry::new(),
            dispatcher: EventDispatcher::new(config.session.catch_handler_panics),
            reconciliation,
            sync_config: config.sync.clone(),
            close_handlers: Vec::new(),
            state: SessionState::Created,
            viewer: None,
            container: None,
        }
    }

    pub fn current_inventory(&self) -> &Arc<MenuInventory> {
        &self.inventory
    }

    pub fn container_type(&self) -> ContainerType {
        self.inventory.container_type()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Sets whether changes to slots without a change handler are refused. Menus are read-only
    /// until this is turned off.
    pub fn set_read_only(&mut self, read_only: bool) -> &mut Self {
        self.read_only = read_only;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn viewer(&self) -> Option<Uuid> {
        self.viewer
    }

    pub fn container(&self) -> Option<OpenedContainer> {
        self.container
    }

    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    pub fn reconciliation(&self) -> &ReconciliationEngine {
        &self.reconciliation
    }

    fn check_slots(&self, slots: &[usize]) -> Result<(), MenuError> {
        slots
            .iter()
            .try_for_each(|slot| self.inventory.check_slot(*slot))
    }

    /// Registers a click handler for `slots`, or for every slot if `slots` is empty.
    pub fn register_click<H: ClickHandler + 'static>(
        &mut self,
        handler: H,
        slots: &[usize],
    ) -> Result<RegistrationId, MenuError> {
        self.check_slots(slots)?;
        Ok(self.registry.register_click(Arc::new(handler), slots))
    }

    /// Registers a change handler for `slots`, or for every slot if `slots` is empty. Change
    /// handlers override the read-only flag for the slots they cover.
    pub fn register_change<H: ChangeHandler + 'static>(
        &mut self,
        handler: H,
        slots: &[usize],
    ) -> Result<RegistrationId, MenuError> {
        self.check_slots(slots)?;
        Ok(self.registry.register_change(Arc::new(handler), slots))
    }

    /// Refuses every change to `slots`, whatever the read-only flag says.
    pub fn register_read_only(&mut self, slots: &[usize]) -> Result<RegistrationId, MenuError> {
        self.register_change(ReadOnlyHandler, slots)
    }

    pub fn register_close<H: CloseHandler + 'static>(&mut self, handler: H) {
        self.close_handlers.push(Arc::new(handler));
    }

    pub fn unregister(&mut self, id: RegistrationId) -> bool {
        self.registry.unregister(id)
    }

    /// Removes every click and change registration that covers any of `slots`.
    pub fn unregister_at(&mut self, slots: &[usize]) -> usize {
        self.registry.unregister_at(slots)
    }

    pub fn unregister_all(&mut self) {
        self.registry.unregister_all();
    }

    /// Opens the menu for `viewer`.
    ///
    /// Returns `Ok(None)` if the session layer couldn't show the menu; the session can then be
    /// opened again later.
    pub async fn open(&mut self, viewer: Uuid) -> Result<Option<OpenedContainer>, MenuError> {
        match self.state {
            SessionState::Open => return Err(MenuError::AlreadyOpen),
            SessionState::Closed => return Err(MenuError::SessionClosed),
            SessionState::Created => {}
        }

        let Some(container) = self.show(viewer).await else {
            debug!("Viewer {viewer} couldn't open the menu");
            return Ok(None);
        };

        self.state = SessionState::Open;
        self.viewer = Some(viewer);
        self.container = Some(container);
        debug!(
            "Opened {:?} menu (sync id {}) for {viewer}",
            container.container_type, container.sync_id
        );
        Ok(Some(container))
    }

    /// Asks the session layer for a window showing the current inventory and title.
    async fn show(&mut self, viewer: Uuid) -> Option<OpenedContainer> {
        let stacks = self.inventory.snapshot().await;
        let container = self
            .host
            .request_open(viewer, self.container_type(), &stacks, &self.title)
            .await?;

        self.reconciliation = ReconciliationEngine::new(stacks.len(), &self.sync_config);
        self.reconciliation.reset(&stacks);
        Some(container)
    }

    /// Closes the viewer's window and opens a new one, needed whenever the layout or the title
    /// changes.
    async fn reopen(&mut self) {
        let Ok((viewer, container)) = self.open_view() else {
            return;
        };

        self.host.request_close(viewer, &container).await;
        match self.show(viewer).await {
            Some(reopened) => {
                debug!("Reopened menu for {viewer} with sync id {}", reopened.sync_id);
                self.container = Some(reopened);
            }
            None => {
                warn!("Viewer {viewer} couldn't reopen the menu, closing it");
                self.finish_close(viewer, container).await;
            }
        }
    }

    /// Replaces the inventory shown by this menu.
    ///
    /// An inventory of the same container type is swapped in silently and the viewer receives
    /// the differing slots. Otherwise all registrations are dropped, as their slot indices refer
    /// to the old layout, and the viewer's window is reopened.
    pub async fn set_current_inventory(&mut self, inventory: Arc<MenuInventory>) {
        let same_type = inventory.container_type() == self.container_type();
        self.inventory = inventory;

        if same_type {
            self.flush().await;
            return;
        }

        debug!(
            "Menu layout changed to {:?}, dropping {} registrations",
            self.container_type(),
            self.registry.len()
        );
        self.registry.unregister_all();
        if self.state == SessionState::Open {
            self.reopen().await;
        } else {
            self.reconciliation =
                ReconciliationEngine::new(self.inventory.size(), &self.sync_config);
        }
    }

    /// Titles can't change on an open window, so an open menu is reopened.
    pub async fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.reopen().await;
    }

    /// Writes a slot directly. This is for the menu's own logic and doesn't consult change
    /// handlers. The viewer gets the new stack with the next [`flush`](Self::flush).
    pub async fn set_slot(
        &mut self,
        slot: usize,
        stack: ItemStack,
    ) -> Result<ItemStack, MenuError> {
        let previous = self.inventory.set_stack(slot, stack).await?;
        self.reconciliation.mark_dirty(slot);
        Ok(previous)
    }

    fn open_view(&self) -> Result<(Uuid, OpenedContainer), MenuError> {
        match (self.state, self.viewer, self.container) {
            (SessionState::Open, Some(viewer), Some(container)) => Ok((viewer, container)),
            _ => Err(MenuError::NotOpen),
        }
    }

    fn ensure_viewer(&self, viewer: Uuid) -> Result<(), MenuError> {
        let (current, _) = self.open_view()?;
        if current == viewer {
            Ok(())
        } else {
            Err(MenuError::UnknownViewer(viewer))
        }
    }

    /// Checks that an event was sent from the window that is open now and addresses a slot of
    /// its layout. Otherwise the viewer shows something else entirely and the whole content is
    /// resent.
    async fn check_client_view(&mut self, sync_id: u8, slot: usize) -> Result<(), MenuError> {
        let (_, container) = self.open_view()?;
        let checked = if container.sync_id == sync_id {
            self.reconciliation.check_slot(slot)
        } else {
            Err(MenuError::DesyncDetected(Desync::StaleWindow {
                sync_id,
                current: container.sync_id,
            }))
        };

        if let Err(err) = checked {
            warn!("{err}, resending the whole menu");
            self.reconciliation.request_full_resync();
            self.flush().await;
            return Err(err);
        }
        Ok(())
    }

    /// Handles a click of the viewer on `slot` of the window `sync_id`.
    ///
    /// Click handlers run in registration order. If one cancels the click or fails, the slot is
    /// resent. Changes requested by the handlers are judged like changes from the viewer.
    pub async fn on_raw_click(
        &mut self,
        viewer: Uuid,
        sync_id: u8,
        slot: usize,
        kind: ClickKind,
    ) -> Result<ClickDecision, MenuError> {
        self.ensure_viewer(viewer)?;
        self.check_client_view(sync_id, slot).await?;

        let stack = self
            .inventory
            .get_stack(slot)
            .await
            .unwrap_or(ItemStack::EMPTY);
        let event = ClickEvent {
            viewer,
            slot_index: slot,
            kind,
            container_type: self.container_type(),
            stack,
        };

        let decision = self.dispatcher.dispatch_click(&self.registry, &event);
        if let Some(err) = &decision.failure {
            self.report(HandlerPhase::Click, Some(viewer), Some(slot), err)
                .await;
        }
        if decision.cancelled {
            self.reconciliation.on_rejected(slot);
        }

        for change in &decision.changes {
            if let Err(err) = self.inventory.check_slot(change.slot_index) {
                warn!("Click handler requested an invalid change: {err}");
                let err = HandlerError::new(err.to_string());
                self.report(HandlerPhase::Click, Some(viewer), Some(change.slot_index), &err)
                    .await;
                continue;
            }
            self.apply_change(viewer, change.slot_index, change.stack, false)
                .await;
        }

        self.flush().await;
        Ok(decision)
    }

    /// Handles the viewer trying to put `proposed` into `slot` of the window `sync_id`.
    pub async fn on_raw_change_attempt(
        &mut self,
        viewer: Uuid,
        sync_id: u8,
        slot: usize,
        proposed: ItemStack,
    ) -> Result<ChangeDecision, MenuError> {
        self.ensure_viewer(viewer)?;
        self.check_client_view(sync_id, slot).await?;

        let decision = self.apply_change(viewer, slot, proposed, true).await;
        self.flush().await;
        Ok(decision)
    }

    /// Judges and commits a change while holding the inventory's mutation lock. The lock is
    /// released before anything is reported or synced.
    ///
    /// `predicted` tells whether the viewer already shows the proposed stack.
    async fn apply_change(
        &mut self,
        viewer: Uuid,
        slot: usize,
        proposed: ItemStack,
        predicted: bool,
    ) -> ChangeDecision {
        let inventory = self.inventory.clone();
        let decision = {
            let mut stacks = inventory.lock().await;
            let Some(previous) = stacks.get(slot).copied() else {
                return ChangeDecision::Rejected;
            };
            let proposal = ChangeProposal {
                viewer,
                slot_index: slot,
                previous,
                proposed,
            };

            let decision = self
                .dispatcher
                .dispatch_change(&self.registry, self.read_only, &proposal);
            if decision.is_accepted() {
                stacks[slot] = proposed;
            }
            decision
        };

        match &decision {
            ChangeDecision::Accepted if predicted => {
                self.reconciliation.on_accepted(slot, proposed)
            }
            ChangeDecision::Accepted => self.reconciliation.mark_dirty(slot),
            ChangeDecision::Rejected => self.reconciliation.on_rejected(slot),
            ChangeDecision::Failed(err) => {
                self.reconciliation.on_rejected(slot);
                self.report(HandlerPhase::Change, Some(viewer), Some(slot), err)
                    .await;
            }
        }
        decision
    }

    /// The viewer's connection is gone. Close handlers run, but no close is sent.
    pub async fn on_viewer_disconnected(&mut self, viewer: Uuid) -> Result<(), MenuError> {
        self.ensure_viewer(viewer)?;
        let (viewer, container) = self.open_view()?;
        self.finish_close(viewer, container).await;
        Ok(())
    }

    /// Closes the viewer's window and ends the session.
    pub async fn close(&mut self) -> Result<(), MenuError> {
        let (viewer, container) = match self.open_view() {
            Ok(view) => view,
            Err(_) if self.state == SessionState::Closed => return Err(MenuError::SessionClosed),
            Err(err) => return Err(err),
        };
        self.host.request_close(viewer, &container).await;
        self.finish_close(viewer, container).await;
        Ok(())
    }

    async fn finish_close(&mut self, viewer: Uuid, container: OpenedContainer) {
        self.state = SessionState::Closed;
        self.container = None;
        self.registry.unregister_all();

        // Taken so every handler runs exactly once.
        let handlers = std::mem::take(&mut self.close_handlers);
        for handler in &handlers {
            if let Err(err) = self.dispatcher.guard(|| handler.on_close(&container, viewer)) {
                warn!("Close handler failed for {viewer}: {err}");
                self.report(HandlerPhase::Close, Some(viewer), None, &err)
                    .await;
            }
        }
        debug!("Closed menu (sync id {}) for {viewer}", container.sync_id);
    }

    /// Sends the viewer every slot it doesn't show correctly, if any.
    pub async fn flush(&mut self) -> Option<SlotDiff> {
        let (viewer, container) = self.open_view().ok()?;

        let stacks = self.inventory.snapshot().await;
        self.reconciliation.detect_changes(&stacks);
        let diff = self.reconciliation.compute_diff(&stacks)?;

        self.host.push_slot_diff(viewer, &container, &diff).await;
        Some(diff)
    }

    async fn report(
        &self,
        phase: HandlerPhase,
        viewer: Option<Uuid>,
        slot_index: Option<usize>,
        error: &HandlerError,
    ) {
        let context = FailureContext {
            phase,
            viewer,
            slot_index,
        };
        self.host.report_handler_failure(&context, error).await;
    }

    /// Applies one queued event.
    pub async fn handle_event(&mut self, event: MenuEvent) -> Result<(), MenuError> {
        match event {
            MenuEvent::Click {
                viewer,
                sync_id,
                slot,
                kind,
            } => {
                self.on_raw_click(viewer, sync_id, slot, kind).await?;
            }
            MenuEvent::ChangeAttempt {
                viewer,
                sync_id,
                slot,
                proposed,
            } => {
                self.on_raw_change_attempt(viewer, sync_id, slot, proposed)
                    .await?;
            }
            MenuEvent::ViewerDisconnected { viewer } => {
                self.on_viewer_disconnected(viewer).await?;
            }
            MenuEvent::SetSlot { slot, stack } => {
                self.set_slot(slot, stack).await?;
                self.flush().await;
            }
            MenuEvent::SetTitle(title) => self.set_title(title).await,
            MenuEvent::SetReadOnly(read_only) => {
                self.set_read_only(read_only);
            }
            MenuEvent::Flush => {
                self.flush().await;
            }
            MenuEvent::Close => self.close().await?,
        }
        Ok(())
    }
}
