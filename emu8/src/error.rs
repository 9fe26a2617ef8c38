//! Result and errors.
use std::fmt::{self, Display, Formatter};

use crate::constants::Address;

pub type Chip8Result<T> = std::result::Result<T, Chip8Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chip8Error {
    /// The instruction word at `address` does not decode to any known operation.
    UnknownOpcode { opcode: u16, address: Address },
    /// Subroutine call at `address` while the call stack is full.
    StackOverflow { address: Address },
    /// Return at `address` while the call stack is empty.
    StackUnderflow { address: Address },
    /// Host input named a key outside the 16-key keypad.
    InvalidKey { key_id: u8 },
    /// Attempt to load a bytecode program that can't fit in memory.
    LargeProgram,
}

impl Display for Chip8Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOpcode { opcode, address } => {
                write!(f, "unknown opcode {opcode:04X} at address {address:03X}")
            }
            Self::StackOverflow { address } => {
                write!(f, "call stack overflow at address {address:03X}")
            }
            Self::StackUnderflow { address } => {
                write!(f, "call stack underflow at address {address:03X}")
            }
            Self::InvalidKey { key_id } => {
                write!(f, "key {key_id:#04X} is outside the keypad")
            }
            Self::LargeProgram => write!(f, "program too large for VM memory"),
        }
    }
}

impl std::error::Error for Chip8Error {}
