//! Hexadecimal keypad input state.
use crate::{
    constants::*,
    error::{Chip8Error, Chip8Result},
};

/// Pressed state of the 16 keys. Pressed is a 1 bit, released is a 0 bit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keypad(u16);

impl Keypad {
    pub fn new() -> Self {
        Default::default()
    }

    /// Build the state from one flag per key, indexed by key value.
    pub fn from_pressed(pressed: [bool; KEY_COUNT as usize]) -> Self {
        let bits = pressed
            .iter()
            .enumerate()
            .filter(|(_, down)| **down)
            .fold(0u16, |acc, (k, _)| acc | (1 << k));
        Self(bits)
    }

    #[inline(always)]
    pub fn bits(&self) -> u16 {
        self.0
    }

    /// Press or release the key with the given value.
    ///
    /// Unlike the lookups made by running programs, host input is checked,
    /// and a value outside the keypad is rejected.
    pub fn set(&mut self, key_id: u8, pressed: bool) -> Chip8Result<()> {
        if key_id >= KEY_COUNT {
            return Err(Chip8Error::InvalidKey { key_id });
        }
        if pressed {
            self.0 |= 1 << key_id;
        } else {
            self.0 &= !(1 << key_id);
        }
        Ok(())
    }

    /// Pressed state of the key with the given value.
    ///
    /// Only the low nibble is significant, so register values above
    /// 0xF alias onto the keypad.
    #[inline]
    pub fn is_pressed(&self, key_id: u8) -> bool {
        self.0 & (1 << (key_id & 0xF)) != 0
    }

    /// Check whether any key is pressed down.
    #[inline(always)]
    pub fn any(&self) -> bool {
        self.0 != 0
    }

    /// Retrieve the value of the lowest key that is pressed down.
    #[inline]
    pub fn first(&self) -> Option<u8> {
        if self.any() {
            Some(self.0.trailing_zeros() as u8)
        } else {
            None
        }
    }

    /// Set all keys to up.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Iterate the pressed state of every key, in key order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..KEY_COUNT).map(move |k| self.is_pressed(k))
    }
}

impl From<[bool; KEY_COUNT as usize]> for Keypad {
    fn from(pressed: [bool; KEY_COUNT as usize]) -> Self {
        Self::from_pressed(pressed)
    }
}
