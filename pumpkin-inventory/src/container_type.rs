/// The layout of a menu. Menus with the same type can swap inventories without the client
/// reopening its window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerType {
    Generic9x1,
    Generic9x2,
    Generic9x3,
    Generic9x4,
    Generic9x5,
    Generic9x6,
    Generic3x3,
    Crafter3x3,
    Anvil,
    Beacon,
    BlastFurnace,
    BrewingStand,
    Crafting,
    Enchantment,
    Furnace,
    Grindstone,
    Hopper,
    Lectern,
    Loom,
    Merchant,
    ShulkerBox,
    Smithing,
    Smoker,
    CartographyTable,
    Stonecutter,
}

impl ContainerType {
    /// Number of slots owned by the menu itself, excluding the viewer's own inventory.
    pub const fn slot_count(self) -> usize {
        match self {
            Self::Generic9x1 => 9,
            Self::Generic9x2 => 18,
            Self::Generic9x3 => 27,
            Self::Generic9x4 => 36,
            Self::Generic9x5 => 45,
            Self::Generic9x6 => 54,
            Self::Generic3x3 | Self::Crafter3x3 => 9,
            Self::Beacon | Self::Lectern => 1,
            Self::Enchantment | Self::Stonecutter => 2,
            Self::Anvil
            | Self::BlastFurnace
            | Self::Furnace
            | Self::Grindstone
            | Self::Merchant
            | Self::Smoker
            | Self::CartographyTable => 3,
            Self::Loom | Self::Smithing => 4,
            Self::BrewingStand | Self::Hopper => 5,
            Self::Crafting => 10,
            Self::ShulkerBox => 27,
        }
    }

    /// The generic chest layout with the given number of rows.
    pub const fn generic_rows(rows: u8) -> Option<Self> {
        Some(match rows {
            1 => Self::Generic9x1,
            2 => Self::Generic9x2,
            3 => Self::Generic9x3,
            4 => Self::Generic9x4,
            5 => Self::Generic9x5,
            6 => Self::Generic9x6,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod test {
    use super::ContainerType;

    #[test]
    fn generic_rows_have_nine_columns() {
        for rows in 1..=6 {
            let container_type = ContainerType::generic_rows(rows).unwrap();
            assert_eq!(container_type.slot_count(), rows as usize * 9);
        }
        assert!(ContainerType::generic_rows(7).is_none());
    }
}
