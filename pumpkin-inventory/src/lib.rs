//! Slot-indexed menus for viewers of shared inventories.
//!
//! A [`MenuSession`] shows a [`MenuInventory`] to one viewer. Plugins register click and change
//! handlers on slots of the session; every inbound click or change attempt is run through them
//! and the viewer is then told about each slot it no longer shows correctly.

pub mod container_click;
pub mod container_type;
pub mod dispatcher;
pub mod driver;
mod error;
pub mod handler;
pub mod host;
pub mod inventory;
pub mod item;
pub mod menu;
pub mod reconciliation;
pub mod slot_registry;

#[cfg(test)]
mod testing;

pub use container_type::ContainerType;
pub use driver::{MenuEvent, SessionDriver};
pub use error::{Desync, HandlerError, MenuError};
pub use host::{MenuHost, OpenedContainer};
pub use inventory::MenuInventory;
pub use item::ItemStack;
pub use menu::{MenuSession, SessionState};
pub use reconciliation::SlotDiff;
