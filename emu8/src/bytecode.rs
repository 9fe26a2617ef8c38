//! Helpers for extracting fields from instruction words.
//!
//! Instructions are two bytes, big endian. The fields are named after
//! the conventional notation:
//!
//! ```text
//! o x y n
//! o n n n
//! ```
//!
//! where `o` is the opcode nibble, `x` and `y` are register indices,
//! `nn` is an immediate byte and `nnn` a 12-bit address.

/// Join the two bytes of an instruction into a word.
#[inline(always)]
pub fn word(bytes: [u8; 2]) -> u16 {
    ((bytes[0] as u16) << 8) | bytes[1] as u16
}

/// Extract the opcode nibble.
#[inline(always)]
pub fn op_code(word: u16) -> u8 {
    ((word & 0xF000) >> 12) as u8
}

/// Extract operand NNN.
#[inline(always)]
pub fn op_nnn(word: u16) -> u16 {
    word & 0x0FFF
}

/// Extract operand NN, which doubles as the postfix of single register instructions.
#[inline(always)]
pub fn op_nn(word: u16) -> u8 {
    (word & 0x00FF) as u8
}

/// Extract operand VX.
#[inline(always)]
pub fn op_x(word: u16) -> u8 {
    ((word & 0x0F00) >> 8) as u8
}

/// Extract operands VX and NN.
#[inline(always)]
pub fn op_xnn(word: u16) -> (u8, u8) {
    (op_x(word), op_nn(word))
}

/// Extract operands VX, VY and N.
#[inline(always)]
pub fn op_xyn(word: u16) -> (u8, u8, u8) {
    (op_x(word), ((word & 0x00F0) >> 4) as u8, op_n(word))
}

/// Extract operand N, the last nibble.
#[inline(always)]
pub fn op_n(word: u16) -> u8 {
    (word & 0x000F) as u8
}
