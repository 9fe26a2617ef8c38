//! CPU and memory state.
use crate::{bytecode, constants::*, display::DisplayBuffer, keypad::Keypad};

/// Core state for a chip8 interpreter.
///
/// This is a plain aggregate of arrays and scalars, so cloning it yields
/// a fully independent copy of the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip8Cpu {
    // ------------------------------------------------------------------------
    // Registers
    /// Program counter pointing to the current position in the bytecode.
    pub(crate) pc: usize,
    /// Stack pointer, the number of return addresses on the stack.
    pub(crate) sp: usize,
    /// General purpose registers for temporary values.
    ///
    /// Register 16 (VF) is used for either the carry flag or borrow switch depending on opcode.
    pub(crate) registers: [u8; REGISTER_COUNT],
    /// Pointer register used for temporarily storing an address. Since addresses are 12 bits, only the
    /// lowest (rightmost) bits are used.
    pub(crate) address: Address,
    /// (DT) Delay timer that counts down to 0.
    pub(crate) delay_timer: u8,
    /// (ST) Sound timer that counts down to 0. When it has a non-zero value, a beep is played.
    pub(crate) sound_timer: u8,
    /// Keyboard input state.
    pub(crate) keys: Keypad,

    // ------------------------------------------------------------------------
    // Memory
    /// Main memory storage space.
    pub(crate) ram: Box<[u8; MEM_SIZE]>,
    /// Stack of return pointers used for jumping when a routine call finishes.
    pub(crate) stack: [Address; STACK_SIZE],
    /// Screen buffer that sprites are drawn to.
    pub(crate) display: DisplayBuffer,
}

impl Default for Chip8Cpu {
    fn default() -> Self {
        Self {
            pc: MEM_START,
            sp: 0,
            registers: [0; REGISTER_COUNT],
            address: 0,
            delay_timer: 0,
            sound_timer: 0,
            keys: Keypad::new(),

            ram: Box::new([0; MEM_SIZE]),
            stack: [0; STACK_SIZE],
            display: DisplayBuffer::new(),
        }
    }
}

impl Chip8Cpu {
    pub fn new() -> Self {
        Default::default()
    }

    /// Put every register, buffer and timer back to its power-on value,
    /// with the digit sprites loaded at the bottom of memory.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
        self.ram[FONTSET_START..FONTSET_START + FONTSET_DATA_LENGTH].copy_from_slice(&FONTSET);
    }

    #[inline(always)]
    pub fn pc(&self) -> Address {
        self.pc as Address
    }

    #[inline(always)]
    pub fn sp(&self) -> usize {
        self.sp
    }

    /// The `I` register.
    #[inline(always)]
    pub fn address(&self) -> Address {
        self.address
    }

    #[inline(always)]
    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }

    #[inline(always)]
    pub fn register(&self, vx: u8) -> u8 {
        self.registers[vx as usize & 0xF]
    }

    /// Return addresses currently on the call stack, oldest first.
    pub fn stack(&self) -> &[Address] {
        &self.stack[..self.sp]
    }

    #[inline(always)]
    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    #[inline(always)]
    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    #[inline(always)]
    pub fn keys(&self) -> &Keypad {
        &self.keys
    }

    pub fn ram(&self) -> &[u8; MEM_SIZE] {
        &self.ram
    }

    pub fn display(&self) -> &DisplayBuffer {
        &self.display
    }

    /// Whether the buzzer should currently be sounding.
    #[inline(always)]
    pub fn buzzer(&self) -> bool {
        self.sound_timer > 0
    }

    /// Read a byte, with the address wrapped into the 12-bit space.
    #[inline(always)]
    pub(crate) fn load(&self, addr: usize) -> u8 {
        self.ram[addr & ADDRESS_MASK]
    }

    /// Write a byte, with the address wrapped into the 12-bit space.
    #[inline(always)]
    pub(crate) fn store(&mut self, addr: usize, value: u8) {
        self.ram[addr & ADDRESS_MASK] = value;
    }

    /// Set the program counter, wrapped into the 12-bit space.
    #[inline(always)]
    pub(crate) fn jump(&mut self, addr: usize) {
        self.pc = addr & ADDRESS_MASK;
    }

    /// Count down both timers, stopping at zero.
    #[inline]
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Extract the instruction at the current program counter.
    #[inline(always)]
    pub fn instr(&self) -> [u8; 2] {
        [self.load(self.pc), self.load(self.pc + 1)]
    }

    /// Instruction at the current program counter, as a word.
    #[inline(always)]
    pub fn instr_word(&self) -> u16 {
        bytecode::word(self.instr())
    }
}
