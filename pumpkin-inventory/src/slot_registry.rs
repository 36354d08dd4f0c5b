use std::sync::Arc;

use crate::handler::{ChangeHandler, ClickHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Click,
    Change,
}

#[derive(Clone)]
pub(crate) enum RegisteredHandler {
    Click(Arc<dyn ClickHandler>),
    Change(Arc<dyn ChangeHandler>),
}

impl RegisteredHandler {
    fn kind(&self) -> HandlerKind {
        match self {
            Self::Click(_) => HandlerKind::Click,
            Self::Change(_) => HandlerKind::Change,
        }
    }
}

/// One handler bound to a set of slots. An empty slot set matches every slot.
#[derive(Clone)]
pub struct Registration {
    id: RegistrationId,
    slots: Box<[usize]>,
    handler: RegisteredHandler,
}

impl Registration {
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    pub fn slots(&self) -> &[usize] {
        &self.slots
    }

    pub fn kind(&self) -> HandlerKind {
        self.handler.kind()
    }

    pub fn is_global(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn matches(&self, slot: usize) -> bool {
        self.is_global() || self.slots.contains(&slot)
    }

    fn targets_any(&self, slots: &[usize]) -> bool {
        self.slots.iter().any(|slot| slots.contains(slot))
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("slots", &self.slots)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Click and change handlers of one menu session, kept in registration order.
///
/// Slot indices are not validated here; the session checks them against its current inventory.
#[derive(Default)]
pub struct SlotRegistry {
    registrations: Vec<Registration>,
    next_id: u64,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_click(
        &mut self,
        handler: Arc<dyn ClickHandler>,
        slots: &[usize],
    ) -> RegistrationId {
        self.register(RegisteredHandler::Click(handler), slots)
    }

    pub fn register_change(
        &mut self,
        handler: Arc<dyn ChangeHandler>,
        slots: &[usize],
    ) -> RegistrationId {
        self.register(RegisteredHandler::Change(handler), slots)
    }

    fn register(&mut self, handler: RegisteredHandler, slots: &[usize]) -> RegistrationId {
        let id = RegistrationId(self.next_id);
        self.next_id += 1;
        self.registrations.push(Registration {
            id,
            slots: slots.into(),
            handler,
        });
        id
    }

    /// Removes exactly one registration.
    pub fn unregister(&mut self, id: RegistrationId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|registration| registration.id != id);
        before != self.registrations.len()
    }

    /// Removes every registration that targets any of `slots`.
    ///
    /// A registration spanning several slots is removed as a whole even if only one of its slots
    /// is listed. Global registrations don't target specific slots and are kept. Returns how many
    /// registrations were removed.
    pub fn unregister_at(&mut self, slots: &[usize]) -> usize {
        let before = self.registrations.len();
        self.registrations
            .retain(|registration| !registration.targets_any(slots));
        before - self.registrations.len()
    }

    pub fn unregister_all(&mut self) {
        self.registrations.clear();
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn registrations(&self) -> impl Iterator<Item = &Registration> + Clone {
        self.registrations.iter()
    }

    /// Registrations of `kind` matching `slot`, in registration order. Global and slot specific
    /// registrations are interleaved by the order they were added in.
    pub fn find(
        &self,
        slot: usize,
        kind: HandlerKind,
    ) -> impl Iterator<Item = &Registration> + Clone {
        self.registrations
            .iter()
            .filter(move |registration| registration.kind() == kind && registration.matches(slot))
    }

    pub fn find_click(&self, slot: usize) -> impl Iterator<Item = &Arc<dyn ClickHandler>> + Clone {
        self.find(slot, HandlerKind::Click)
            .filter_map(|registration| match &registration.handler {
                RegisteredHandler::Click(handler) => Some(handler),
                RegisteredHandler::Change(_) => None,
            })
    }

    pub fn find_change(
        &self,
        slot: usize,
    ) -> impl Iterator<Item = &Arc<dyn ChangeHandler>> + Clone {
        self.find(slot, HandlerKind::Change)
            .filter_map(|registration| match &registration.handler {
                RegisteredHandler::Change(handler) => Some(handler),
                RegisteredHandler::Click(_) => None,
            })
    }
}
