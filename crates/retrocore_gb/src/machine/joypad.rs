use crate::interrupts::InterruptFlags;

use super::{io, Mmu};

/// DMG buttons, numbered by their bit in the joypad state byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Right = 4,
    Left = 5,
    Up = 6,
    Down = 7,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Right,
        Button::Left,
        Button::Up,
        Button::Down,
    ];

    pub fn from_index(index: usize) -> Option<Button> {
        Self::ALL.get(index).copied()
    }
}

/// Button state, active-low: bits 0-3 hold the action buttons, bits 4-7 the
/// directions.
#[derive(Clone, Debug)]
pub struct Joypad {
    state: u8,
}

impl Default for Joypad {
    fn default() -> Self {
        Self { state: 0xFF }
    }
}

impl Joypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.state = 0xFF;
    }

    pub fn state(&self) -> u8 {
        self.state
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.state & (1 << button as u8) == 0
    }

    /// A press also requests the joypad interrupt.
    pub fn set_button(&mut self, mmu: &mut Mmu, button: Button, pressed: bool) {
        let mask = 1 << button as u8;
        if pressed {
            self.state &= !mask;
            mmu.request_interrupt(InterruptFlags::JOYPAD);
        } else {
            self.state |= mask;
        }
    }

    /// Rebuild JOYP (FF00) from the selection bits currently stored there.
    ///
    /// Bit 5 low selects the action buttons, bit 4 low the directions; a
    /// pressed button in a selected group pulls its low-nibble bit to 0.
    pub fn update(&self, mmu: &mut Mmu) {
        let select = mmu.read(io::JOYP) & 0x30;
        let mut low = 0x0F;

        if select & 0x20 == 0 {
            low &= self.state & 0x0F;
        }
        if select & 0x10 == 0 {
            low &= self.state >> 4;
        }

        mmu.write(io::JOYP, 0xC0 | select | low);
    }
}
