use std::sync::{
    atomic::{AtomicBool, AtomicU8, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    container_type::ContainerType,
    host::{FailureContext, MenuHost, OpenedContainer},
    item::ItemStack,
    reconciliation::SlotDiff,
    HandlerError,
};

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Open {
        viewer: Uuid,
        container: OpenedContainer,
        stacks: Vec<ItemStack>,
        title: String,
    },
    Close {
        viewer: Uuid,
        container: OpenedContainer,
    },
    Diff {
        viewer: Uuid,
        diff: SlotDiff,
    },
    Failure {
        context: FailureContext,
        error: HandlerError,
    },
}

/// Records every call a session makes to its host.
#[derive(Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
    refuse_open: AtomicBool,
    next_sync_id: AtomicU8,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refuse_open(&self, refuse: bool) {
        self.refuse_open.store(refuse, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn take_calls(&self) -> Vec<HostCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    pub fn diffs(&self) -> Vec<SlotDiff> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Diff { diff, .. } => Some(diff),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<(FailureContext, HandlerError)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Failure { context, error } => Some((context, error)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MenuHost for RecordingHost {
    async fn request_open(
        &self,
        viewer: Uuid,
        container_type: ContainerType,
        stacks: &[ItemStack],
        title: &str,
    ) -> Option<OpenedContainer> {
        if self.refuse_open.load(Ordering::SeqCst) {
            return None;
        }
        let container = OpenedContainer {
            sync_id: self.next_sync_id.fetch_add(1, Ordering::SeqCst) % 100 + 1,
            container_type,
        };
        self.record(HostCall::Open {
            viewer,
            container,
            stacks: stacks.to_vec(),
            title: title.to_string(),
        });
        Some(container)
    }

    async fn request_close(&self, viewer: Uuid, container: &OpenedContainer) {
        self.record(HostCall::Close {
            viewer,
            container: *container,
        });
    }

    async fn push_slot_diff(&self, viewer: Uuid, _container: &OpenedContainer, diff: &SlotDiff) {
        self.record(HostCall::Diff {
            viewer,
            diff: diff.clone(),
        });
    }

    async fn report_handler_failure(&self, context: &FailureContext, error: &HandlerError) {
        self.record(HostCall::Failure {
            context: *context,
            error: error.clone(),
        });
    }
}
