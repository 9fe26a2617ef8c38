mod bytecode;
mod clock;
pub mod constants;
mod cpu;
mod display;
mod error;
mod history;
mod keypad;
mod op;
mod vm;

pub use self::clock::Hz;

pub mod prelude {
    pub use super::{
        clock::Hz,
        cpu::Chip8Cpu,
        display::DisplayBuffer,
        error::{Chip8Error, Chip8Result},
        history::History,
        keypad::Keypad,
        op::Op,
        vm::{Chip8Conf, Chip8Vm, Flow, Snapshot},
    };
}
