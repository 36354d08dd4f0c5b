use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};

use log::warn;

use crate::{
    handler::{ChangeProposal, ClickEvent, SlotChange},
    slot_registry::SlotRegistry,
    HandlerError,
};

/// The result of running every click handler of a slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickDecision {
    /// The default behaviour of the click must not happen.
    pub cancelled: bool,
    /// Changes requested by the handlers, in the order they were requested.
    pub changes: Vec<SlotChange>,
    /// Set if a handler failed. The click is then cancelled and no changes are requested.
    pub failure: Option<HandlerError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeDecision {
    Accepted,
    Rejected,
    /// A handler failed; the change is rejected.
    Failed(HandlerError),
}

impl ChangeDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Runs handlers for one event at a time.
///
/// Dispatching only borrows the registry, so handlers can never change the registrations that
/// are being iterated.
#[derive(Debug, Clone, Copy)]
pub struct EventDispatcher {
    catch_panics: bool,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EventDispatcher {
    pub fn new(catch_panics: bool) -> Self {
        Self { catch_panics }
    }

    /// Runs all click handlers of the clicked slot exactly once, in registration order.
    ///
    /// A failing handler aborts the dispatch: later handlers don't run, the click is cancelled
    /// and changes requested by earlier handlers are dropped.
    pub fn dispatch_click(&self, registry: &SlotRegistry, event: &ClickEvent) -> ClickDecision {
        let mut decision = ClickDecision::default();

        for handler in registry.find_click(event.slot_index) {
            match self.guard(|| handler.on_click(event)) {
                Ok(outcome) => {
                    let (cancelled, changes) = outcome.into_parts();
                    decision.cancelled |= cancelled;
                    decision.changes.extend(changes);
                }
                Err(err) => {
                    warn!(
                        "Click handler for slot {} failed, cancelling the click: {}",
                        event.slot_index, err
                    );
                    return ClickDecision {
                        cancelled: true,
                        changes: Vec::new(),
                        failure: Some(err),
                    };
                }
            }
        }

        decision
    }

    /// A change is accepted only if every matching handler accepts it. Without any matching
    /// handler the session's read-only flag decides.
    pub fn dispatch_change(
        &self,
        registry: &SlotRegistry,
        read_only: bool,
        proposal: &ChangeProposal,
    ) -> ChangeDecision {
        let mut handlers = registry.find_change(proposal.slot_index).peekable();

        if handlers.peek().is_none() {
            return if read_only {
                ChangeDecision::Rejected
            } else {
                ChangeDecision::Accepted
            };
        }

        for handler in handlers {
            match self.guard(|| handler.on_change(proposal)) {
                Ok(true) => {}
                Ok(false) => return ChangeDecision::Rejected,
                Err(err) => {
                    warn!(
                        "Change handler for slot {} failed, rejecting the change: {}",
                        proposal.slot_index, err
                    );
                    return ChangeDecision::Failed(err);
                }
            }
        }

        ChangeDecision::Accepted
    }

    /// Runs a handler, turning a panic into a [`HandlerError`] unless panics should unwind.
    pub(crate) fn guard<T>(
        &self,
        handler: impl FnOnce() -> Result<T, HandlerError>,
    ) -> Result<T, HandlerError> {
        if !self.catch_panics {
            return handler();
        }
        match panic::catch_unwind(AssertUnwindSafe(handler)) {
            Ok(result) => result,
            Err(payload) => Err(HandlerError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use uuid::Uuid;

    use crate::{
        container_click::{ClickKind, MouseClick},
        container_type::ContainerType,
        handler::{
            ChangeHandler, ChangeProposal, ClickEvent, ClickHandler, ClickOutcome,
            ReadOnlyHandler, SlotChange,
        },
        item::ItemStack,
        slot_registry::SlotRegistry,
        HandlerError,
    };

    use super::{ChangeDecision, EventDispatcher};

    fn proposal(slot_index: usize) -> ChangeProposal {
        ChangeProposal {
            viewer: Uuid::nil(),
            slot_index,
            previous: ItemStack::EMPTY,
            proposed: ItemStack::new(1, 5),
        }
    }

    fn click(slot_index: usize) -> ClickEvent {
        ClickEvent {
            viewer: Uuid::nil(),
            slot_index,
            kind: ClickKind::MouseClick(MouseClick::Left),
            container_type: ContainerType::Generic9x1,
            stack: ItemStack::EMPTY,
        }
    }

    fn accept() -> Arc<dyn ChangeHandler> {
        Arc::new(|_: &ChangeProposal| -> Result<bool, HandlerError> { Ok(true) })
    }

    struct CountingChange {
        calls: AtomicUsize,
        answer: bool,
    }

    impl ChangeHandler for CountingChange {
        fn on_change(&self, _proposal: &ChangeProposal) -> Result<bool, HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer)
        }
    }

    struct RecordingClick {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        outcome: ClickOutcome,
    }

    impl ClickHandler for RecordingClick {
        fn on_click(&self, _event: &ClickEvent) -> Result<ClickOutcome, HandlerError> {
            self.log.lock().unwrap().push(self.name);
            Ok(self.outcome.clone())
        }
    }

    struct FailingClick;

    impl ClickHandler for FailingClick {
        fn on_click(&self, _event: &ClickEvent) -> Result<ClickOutcome, HandlerError> {
            Err(HandlerError::new("boom"))
        }
    }

    #[test]
    fn unhandled_slots_follow_read_only_flag() {
        let registry = SlotRegistry::new();
        let dispatcher = EventDispatcher::default();

        for slot in 0..9 {
            assert_eq!(
                dispatcher.dispatch_change(&registry, true, &proposal(slot)),
                ChangeDecision::Rejected
            );
            assert_eq!(
                dispatcher.dispatch_change(&registry, false, &proposal(slot)),
                ChangeDecision::Accepted
            );
        }
    }

    #[test]
    fn accepting_handlers_override_read_only() {
        let mut registry = SlotRegistry::new();
        registry.register_change(accept(), &[2]);
        registry.register_change(accept(), &[]);
        let dispatcher = EventDispatcher::default();

        for read_only in [true, false] {
            assert!(dispatcher
                .dispatch_change(&registry, read_only, &proposal(2))
                .is_accepted());
        }
    }

    #[test]
    fn one_rejection_rejects_and_short_circuits() {
        let mut registry = SlotRegistry::new();
        let later = Arc::new(CountingChange {
            calls: AtomicUsize::new(0),
            answer: true,
        });
        registry.register_change(accept(), &[3]);
        registry.register_change(Arc::new(ReadOnlyHandler), &[3]);
        registry.register_change(later.clone(), &[3]);

        let decision = EventDispatcher::default().dispatch_change(&registry, false, &proposal(3));
        assert_eq!(decision, ChangeDecision::Rejected);
        assert_eq!(later.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failing_change_handler_is_fail_closed() {
        let mut registry = SlotRegistry::new();
        registry.register_change(
            Arc::new(|_: &ChangeProposal| -> Result<bool, HandlerError> {
                Err(HandlerError::new("database offline"))
            }),
            &[],
        );

        let decision = EventDispatcher::default().dispatch_change(&registry, false, &proposal(1));
        assert_eq!(
            decision,
            ChangeDecision::Failed(HandlerError::new("database offline"))
        );
        assert!(!decision.is_accepted());
    }

    #[test]
    fn panicking_change_handler_is_fail_closed() {
        let mut registry = SlotRegistry::new();
        registry.register_change(
            Arc::new(|_: &ChangeProposal| -> Result<bool, HandlerError> { panic!("oops") }),
            &[1],
        );

        let decision = EventDispatcher::default().dispatch_change(&registry, false, &proposal(1));
        assert_eq!(
            decision,
            ChangeDecision::Failed(HandlerError::Panicked("oops".to_string()))
        );
    }

    #[test]
    fn click_handlers_run_once_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = SlotRegistry::new();
        registry.register_click(
            Arc::new(RecordingClick {
                name: "first",
                log: log.clone(),
                outcome: ClickOutcome::pass().and_set(1, ItemStack::new(1, 9)),
            }),
            &[4],
        );
        registry.register_click(
            Arc::new(RecordingClick {
                name: "global",
                log: log.clone(),
                outcome: ClickOutcome::cancel(),
            }),
            &[],
        );
        registry.register_click(
            Arc::new(RecordingClick {
                name: "elsewhere",
                log: log.clone(),
                outcome: ClickOutcome::pass(),
            }),
            &[5],
        );

        let decision = EventDispatcher::default().dispatch_click(&registry, &click(4));
        assert_eq!(*log.lock().unwrap(), vec!["first", "global"]);
        assert!(decision.cancelled);
        assert_eq!(
            decision.changes,
            vec![SlotChange {
                slot_index: 1,
                stack: ItemStack::new(1, 9)
            }]
        );
        assert!(decision.failure.is_none());
    }

    #[test]
    fn failing_click_handler_aborts_dispatch() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = SlotRegistry::new();
        registry.register_click(
            Arc::new(RecordingClick {
                name: "before",
                log: log.clone(),
                outcome: ClickOutcome::pass().and_set(0, ItemStack::new(1, 1)),
            }),
            &[],
        );
        registry.register_click(Arc::new(FailingClick), &[]);
        registry.register_click(
            Arc::new(RecordingClick {
                name: "after",
                log: log.clone(),
                outcome: ClickOutcome::pass(),
            }),
            &[],
        );

        let decision = EventDispatcher::default().dispatch_click(&registry, &click(0));
        assert_eq!(*log.lock().unwrap(), vec!["before"]);
        assert!(decision.cancelled);
        assert!(decision.changes.is_empty());
        assert_eq!(decision.failure, Some(HandlerError::new("boom")));
    }
}
