use crate::MenuError;

/// The raw action mode of a client click, as the session layer receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotActionType {
    Pickup,
    QuickMove,
    Swap,
    Clone,
    Throw,
    QuickCraft,
    PickupAll,
}

/// A decoded client click: which slot it targets and how the viewer interacted with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Click {
    pub slot: ClickTarget,
    pub kind: ClickKind,
}

const BUTTON_CLICK_LEFT: i8 = 0;
const BUTTON_CLICK_RIGHT: i8 = 1;

const KEY_CLICK_OFFHAND: i8 = 40;
const KEY_CLICK_HOTBAR_START: i8 = 0;
const KEY_CLICK_HOTBAR_END: i8 = 9;

const SLOT_INDEX_OUTSIDE: i16 = -999;

impl Click {
    pub fn new(mode: SlotActionType, button: i8, slot: i16) -> Result<Self, MenuError> {
        match mode {
            SlotActionType::Pickup => Self::new_normal_click(button, slot),
            // Both buttons do the same here, so we omit it
            SlotActionType::QuickMove => Self::new_shift_click(slot),
            SlotActionType::Swap => Self::new_key_click(button, slot),
            SlotActionType::Clone => Ok(Self {
                kind: ClickKind::CreativePickItem,
                slot: ClickTarget::slot(slot)?,
            }),
            SlotActionType::Throw => Self::new_drop_item(button, slot),
            SlotActionType::QuickCraft => Self::new_drag_item(button, slot),
            SlotActionType::PickupAll => Ok(Self {
                kind: ClickKind::DoubleClick,
                slot: ClickTarget::slot(slot)?,
            }),
        }
    }

    fn new_normal_click(button: i8, slot: i16) -> Result<Self, MenuError> {
        let button = match button {
            BUTTON_CLICK_LEFT => MouseClick::Left,
            BUTTON_CLICK_RIGHT => MouseClick::Right,
            _ => Err(MenuError::InvalidClick)?,
        };
        Ok(Self {
            kind: ClickKind::MouseClick(button),
            slot: ClickTarget::slot_or_outside(slot)?,
        })
    }

    fn new_shift_click(slot: i16) -> Result<Self, MenuError> {
        Ok(Self {
            slot: ClickTarget::slot(slot)?,
            kind: ClickKind::ShiftClick,
        })
    }

    fn new_key_click(button: i8, slot: i16) -> Result<Self, MenuError> {
        let key = match button {
            KEY_CLICK_HOTBAR_START..KEY_CLICK_HOTBAR_END => KeyClick::Slot(button as u8),
            KEY_CLICK_OFFHAND => KeyClick::Offhand,
            _ => Err(MenuError::InvalidClick)?,
        };

        Ok(Self {
            kind: ClickKind::KeyClick(key),
            slot: ClickTarget::slot(slot)?,
        })
    }

    fn new_drop_item(button: i8, slot: i16) -> Result<Self, MenuError> {
        let drop_type = DropType::from_i8(button)?;
        Ok(Self {
            kind: ClickKind::DropType(drop_type),
            slot: ClickTarget::slot_or_outside(slot)?,
        })
    }

    fn new_drag_item(button: i8, slot: i16) -> Result<Self, MenuError> {
        let state = match button {
            0 => MouseDragState::Start(MouseDragType::Left),
            4 => MouseDragState::Start(MouseDragType::Right),
            8 => MouseDragState::Start(MouseDragType::Middle),
            1 | 5 | 9 => MouseDragState::AddSlot,
            2 | 6 | 10 => MouseDragState::End,
            _ => Err(MenuError::InvalidClick)?,
        };
        Ok(Self {
            slot: match &state {
                MouseDragState::AddSlot => ClickTarget::slot(slot)?,
                _ => ClickTarget::OutsideInventory,
            },
            kind: ClickKind::MouseDrag { drag_state: state },
        })
    }
}

/// The interaction kind handed to click handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickKind {
    MouseClick(MouseClick),
    ShiftClick,
    KeyClick(KeyClick),
    CreativePickItem,
    DropType(DropType),
    MouseDrag { drag_state: MouseDragState },
    DoubleClick,
}

impl ClickKind {
    pub fn is_primary(&self) -> bool {
        matches!(self, Self::MouseClick(MouseClick::Left))
    }

    pub fn is_secondary(&self) -> bool {
        matches!(self, Self::MouseClick(MouseClick::Right))
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MouseClick {
    Left,
    Right,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum KeyClick {
    Slot(u8),
    Offhand,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ClickTarget {
    Slot(usize),
    OutsideInventory,
}

impl ClickTarget {
    fn slot(slot: i16) -> Result<Self, MenuError> {
        Ok(Self::Slot(
            slot.try_into().or(Err(MenuError::InvalidClick))?,
        ))
    }

    fn slot_or_outside(slot: i16) -> Result<Self, MenuError> {
        match slot {
            SLOT_INDEX_OUTSIDE => Ok(Self::OutsideInventory),
            _ => Self::slot(slot),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DropType {
    SingleItem,
    FullStack,
}

impl DropType {
    fn from_i8(value: i8) -> Result<Self, MenuError> {
        Ok(match value {
            0 => Self::SingleItem,
            1 => Self::FullStack,
            _ => return Err(MenuError::InvalidClick),
        })
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MouseDragType {
    Left,
    Right,
    Middle,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MouseDragState {
    Start(MouseDragType),
    AddSlot,
    End,
}
