/// An opaque stack of items held by a single slot.
///
/// The menu core never interprets items; it only needs to tell stacks apart, so an item is
/// reduced to its registry id. Id `0` is air, which like a count of `0` means the slot is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ItemStack {
    pub item_count: u8,
    pub item_id: u16,
}

impl ItemStack {
    pub const EMPTY: ItemStack = ItemStack {
        item_count: 0,
        item_id: 0,
    };

    pub const fn new(item_count: u8, item_id: u16) -> Self {
        Self {
            item_count,
            item_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item_count == 0 || self.item_id == 0
    }

    /// Compares two stacks the way a client would render them, so all empty stacks are equal.
    pub fn are_equal(&self, other: &ItemStack) -> bool {
        if self.is_empty() {
            return other.is_empty();
        }
        self.item_id == other.item_id && self.item_count == other.item_count
    }
}

#[cfg(test)]
mod test {
    use super::ItemStack;

    #[test]
    fn empty_stacks_are_equal() {
        assert!(ItemStack::EMPTY.are_equal(&ItemStack::new(0, 42)));
        assert!(ItemStack::new(3, 0).are_equal(&ItemStack::EMPTY));
        assert!(!ItemStack::EMPTY.are_equal(&ItemStack::new(1, 42)));
    }
}
