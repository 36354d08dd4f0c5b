use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::{container_type::ContainerType, item::ItemStack, MenuError};

/// The authoritative contents of a menu.
///
/// The stack list is guarded by a single lock which doubles as the mutation lock for every
/// session showing this inventory, so two viewers of a shared chest never race on a commit.
#[derive(Debug)]
pub struct MenuInventory {
    container_type: ContainerType,
    stacks: Mutex<Vec<ItemStack>>,
}

impl MenuInventory {
    pub fn new(container_type: ContainerType) -> Self {
        Self {
            container_type,
            stacks: Mutex::new(vec![ItemStack::EMPTY; container_type.slot_count()]),
        }
    }

    /// Creates an inventory from existing contents, padding missing slots with empty stacks.
    pub fn with_stacks(
        container_type: ContainerType,
        mut stacks: Vec<ItemStack>,
    ) -> Result<Self, MenuError> {
        let size = container_type.slot_count();
        if stacks.len() > size {
            return Err(MenuError::InvalidSlotIndex {
                index: stacks.len() - 1,
                size,
            });
        }
        stacks.resize(size, ItemStack::EMPTY);

        Ok(Self {
            container_type,
            stacks: Mutex::new(stacks),
        })
    }

    pub fn container_type(&self) -> ContainerType {
        self.container_type
    }

    pub fn size(&self) -> usize {
        self.container_type.slot_count()
    }

    pub fn check_slot(&self, slot: usize) -> Result<(), MenuError> {
        if slot < self.size() {
            Ok(())
        } else {
            Err(MenuError::InvalidSlotIndex {
                index: slot,
                size: self.size(),
            })
        }
    }

    pub async fn get_stack(&self, slot: usize) -> Option<ItemStack> {
        self.stacks.lock().await.get(slot).copied()
    }

    /// Replaces the stack in `slot`, returning the previous one.
    pub async fn set_stack(&self, slot: usize, stack: ItemStack) -> Result<ItemStack, MenuError> {
        self.check_slot(slot)?;
        let mut stacks = self.stacks.lock().await;
        Ok(std::mem::replace(&mut stacks[slot], stack))
    }

    pub async fn snapshot(&self) -> Vec<ItemStack> {
        self.stacks.lock().await.clone()
    }

    /// Acquires the mutation lock. Don't hold it across calls into other sessions.
    pub async fn lock(&self) -> MutexGuard<'_, Vec<ItemStack>> {
        self.stacks.lock().await
    }

    pub fn same_inventory(a: &Arc<Self>, b: &Arc<Self>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

#[cfg(test)]
mod test {
    use crate::{container_type::ContainerType, item::ItemStack, MenuError};

    use super::MenuInventory;

    #[tokio::test]
    async fn set_stack_returns_previous() {
        let inventory = MenuInventory::new(ContainerType::Hopper);
        assert_eq!(inventory.size(), 5);

        let previous = inventory.set_stack(2, ItemStack::new(4, 1)).await.unwrap();
        assert!(previous.is_empty());
        assert_eq!(inventory.get_stack(2).await, Some(ItemStack::new(4, 1)));
    }

    #[tokio::test]
    async fn rejects_out_of_range_slots() {
        let inventory = MenuInventory::new(ContainerType::Hopper);
        let result = inventory.set_stack(5, ItemStack::new(1, 1)).await;
        assert!(matches!(
            result,
            Err(MenuError::InvalidSlotIndex { index: 5, size: 5 })
        ));
        assert_eq!(inventory.get_stack(5).await, None);
    }

    #[tokio::test]
    async fn with_stacks_pads_to_layout() {
        let inventory =
            MenuInventory::with_stacks(ContainerType::Generic9x1, vec![ItemStack::new(1, 3)])
                .unwrap();
        let snapshot = inventory.snapshot().await;
        assert_eq!(snapshot.len(), 9);
        assert_eq!(snapshot[0], ItemStack::new(1, 3));

        let too_many = vec![ItemStack::EMPTY; 10];
        assert!(MenuInventory::with_stacks(ContainerType::Generic9x1, too_many).is_err());
    }
}
