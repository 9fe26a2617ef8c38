//! Decoded instruction representation.
//!
//! Each instruction word is decoded once into an [`Op`], which the VM
//! then executes with an exhaustive match.
use crate::{bytecode::*, constants::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum Op {
    /// 0000
    ///
    /// Program termination sentinel. Not part of the instruction set,
    /// but zeroed memory past the end of a program decodes to it.
    Halt,
    /// 00E0 (CLS)
    ///
    /// Clear the screen.
    ClearScreen,
    /// 00EE (RET)
    ///
    /// Return from the sub-routine.
    Return,
    /// 1nnn (JP addr)
    ///
    /// Jump to the address in `nnn`.
    Jump { address: Address },
    /// 2nnn (CALL addr)
    ///
    /// Call the sub-routine at address `nnn`.
    Call { address: Address },
    /// Annn (LD I, addr)
    ///
    /// Load address into register `I`.
    Load_Address { address: Address },
    /// Bnnn (JP V0, addr)
    ///
    /// Jump to location nnn + V0.
    Jump_V0 { address: Address },

    // ------------------------------------------------------------------------
    // Register and byte
    /// 3xnn (SE Vx, byte)
    ///
    /// Skip the next instruction if register `Vx` equals value `nn`
    Skip_Eq_Byte { vx: u8, nn: u8 },
    /// 4xnn (SNE Vx, byte)
    ///
    /// Skip the next instruction if register `Vx` does not equal value `nn`.
    Skip_NotEq_Byte { vx: u8, nn: u8 },
    /// 6xnn (LD Vx, byte)
    Load_Byte { vx: u8, nn: u8 },
    /// 7xnn (ADD Vx, byte)
    ///
    /// Add byte to the value in register `Vx`, store the result in `Vx`.
    /// The carry flag is not touched.
    Add_Byte { vx: u8, nn: u8 },
    /// Cxnn (RND Vx, byte)
    ///
    /// Generate random number.
    Random { vx: u8, nn: u8 },

    // ------------------------------------------------------------------------
    // Single register
    /// Ex9E (SKP Vx)
    Skip_Key { vx: u8 },
    /// ExA1 (SKNP Vx)
    Skip_NotKey { vx: u8 },
    /// Fx07 (LD Vx, DT)
    Load_Vx_Delay { vx: u8 },
    /// Fx0A (LD Vx, K)
    ///
    /// Blocks until a key is pressed.
    Wait_Key { vx: u8 },
    /// Fx15 (LD DT, Vx)
    Load_Delay_Vx { vx: u8 },
    /// Fx18 (LD ST, Vx)
    Load_Sound_Vx { vx: u8 },
    /// Fx1E (ADD I, Vx)
    Add_Address { vx: u8 },
    /// Fx29 (LD F, Vx)
    ///
    /// Point `I` at the built-in sprite for the digit in `Vx`.
    Load_Digit { vx: u8 },
    /// Fx33 (LD B, Vx)
    Store_Bcd { vx: u8 },
    /// Fx55 (LD [I], Vx)
    Store_Registers { vx: u8 },
    /// Fx65 (LD Vx, [I])
    Load_Registers { vx: u8 },

    // ------------------------------------------------------------------------
    // Two registers
    /// 5xy0 (SE Vx, Vy)
    ///
    /// Skip the next instruction if register `Vx` equals register `Vy`.
    Skip_Eq { vx: u8, vy: u8 },
    /// 9xy0 (SNE Vx, Vy)
    ///
    /// Skip the next instruction if register `Vx` does not equal register `Vy`.
    Skip_NotEq { vx: u8, vy: u8 },
    /// 8xy0 (LD Vx, Vy)
    ///
    /// Store the value of register VY in register VX.
    Load_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy1 (OR Vx, Vy)
    Or_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy2 (AND Vx, Vy)
    And_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy3 (XOR Vx, Vy)
    Xor_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy4 (ADD Vx, Vy)
    ///
    /// ADDs VY to VX, and stores the result in VX.
    /// Overflow is wrapped. If overflowed, set VF to 1, else 0.
    Add_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy5 (SUB Vx, Vy)
    ///
    /// Subtracts VY from VX, and stores the result in VX.
    /// VF is set to 1 when VX was strictly greater than VY, else 0.
    Sub_Vx_Vy { vx: u8, vy: u8 },
    /// 8xy6 (SHR Vx)
    ///
    /// VY is unused.
    ShiftRight { vx: u8 },
    /// 8xy7 (SUBN Vx, Vy)
    ///
    /// Subtracts VX from VY, and stores the result in VX.
    /// VF is set to 1 when VY was strictly greater than VX, else 0.
    SubReverse_Vx_Vy { vx: u8, vy: u8 },
    /// 8xyE (SHL Vx)
    ///
    /// VY is unused.
    ShiftLeft { vx: u8 },

    /// Dxyn (DRW Vx, Vy, nibble)
    ///
    /// Draw sprite to the display buffer.
    Draw { vx: u8, vy: u8, n: u8 },
}

impl Op {
    /// Decode an instruction word.
    ///
    /// Fields are tried from the most specific to the widest: exact words
    /// first, then address operands, register and byte, register and postfix,
    /// two registers and postfix, and finally the draw instruction.
    ///
    /// Returns `None` when the word matches no known operation.
    pub fn decode(word: u16) -> Option<Op> {
        match word {
            HALT_WORD => return Some(Op::Halt),
            0x00E0 => return Some(Op::ClearScreen),
            0x00EE => return Some(Op::Return),
            _ => {}
        }

        let code = op_code(word);

        let address = op_nnn(word);
        match code {
            0x1 => return Some(Op::Jump { address }),
            0x2 => return Some(Op::Call { address }),
            0xA => return Some(Op::Load_Address { address }),
            0xB => return Some(Op::Jump_V0 { address }),
            _ => {}
        }

        let (vx, nn) = op_xnn(word);
        match code {
            0x3 => return Some(Op::Skip_Eq_Byte { vx, nn }),
            0x4 => return Some(Op::Skip_NotEq_Byte { vx, nn }),
            0x6 => return Some(Op::Load_Byte { vx, nn }),
            0x7 => return Some(Op::Add_Byte { vx, nn }),
            0xC => return Some(Op::Random { vx, nn }),
            _ => {}
        }

        // What was an immediate byte is now a postfix selecting the operation.
        let single = match (code, nn) {
            (0xE, 0x9E) => Some(Op::Skip_Key { vx }),
            (0xE, 0xA1) => Some(Op::Skip_NotKey { vx }),
            (0xF, 0x07) => Some(Op::Load_Vx_Delay { vx }),
            (0xF, 0x0A) => Some(Op::Wait_Key { vx }),
            (0xF, 0x15) => Some(Op::Load_Delay_Vx { vx }),
            (0xF, 0x18) => Some(Op::Load_Sound_Vx { vx }),
            (0xF, 0x1E) => Some(Op::Add_Address { vx }),
            (0xF, 0x29) => Some(Op::Load_Digit { vx }),
            (0xF, 0x33) => Some(Op::Store_Bcd { vx }),
            (0xF, 0x55) => Some(Op::Store_Registers { vx }),
            (0xF, 0x65) => Some(Op::Load_Registers { vx }),
            _ => None,
        };
        if single.is_some() {
            return single;
        }

        let (vx, vy, n) = op_xyn(word);
        match (code, n) {
            (0x5, 0x0) => Some(Op::Skip_Eq { vx, vy }),
            (0x8, 0x0) => Some(Op::Load_Vx_Vy { vx, vy }),
            (0x8, 0x1) => Some(Op::Or_Vx_Vy { vx, vy }),
            (0x8, 0x2) => Some(Op::And_Vx_Vy { vx, vy }),
            (0x8, 0x3) => Some(Op::Xor_Vx_Vy { vx, vy }),
            (0x8, 0x4) => Some(Op::Add_Vx_Vy { vx, vy }),
            (0x8, 0x5) => Some(Op::Sub_Vx_Vy { vx, vy }),
            (0x8, 0x6) => Some(Op::ShiftRight { vx }),
            (0x8, 0x7) => Some(Op::SubReverse_Vx_Vy { vx, vy }),
            (0x8, 0xE) => Some(Op::ShiftLeft { vx }),
            (0x9, 0x0) => Some(Op::Skip_NotEq { vx, vy }),
            (0xD, _) => Some(Op::Draw { vx, vy, n }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_decode_exact_words() {
        assert_eq!(Op::decode(0x0000), Some(Op::Halt));
        assert_eq!(Op::decode(0x00E0), Some(Op::ClearScreen));
        assert_eq!(Op::decode(0x00EE), Some(Op::Return));
    }

    #[test]
    fn test_decode_operands() {
        assert_eq!(Op::decode(0x1ABC), Some(Op::Jump { address: 0xABC }));
        assert_eq!(Op::decode(0xB300), Some(Op::Jump_V0 { address: 0x300 }));
        assert_eq!(Op::decode(0x7A05), Some(Op::Add_Byte { vx: 0xA, nn: 0x05 }));
        assert_eq!(Op::decode(0xF533), Some(Op::Store_Bcd { vx: 0x5 }));
        assert_eq!(Op::decode(0xE19E), Some(Op::Skip_Key { vx: 0x1 }));
        assert_eq!(
            Op::decode(0x8124),
            Some(Op::Add_Vx_Vy { vx: 0x1, vy: 0x2 })
        );
        assert_eq!(Op::decode(0x83F6), Some(Op::ShiftRight { vx: 0x3 }));
        assert_eq!(
            Op::decode(0xD12F),
            Some(Op::Draw {
                vx: 0x1,
                vy: 0x2,
                n: 0xF
            })
        );
    }

    #[test]
    fn test_decode_unknown() {
        // 0nnn (SYS addr) is not supported.
        assert_eq!(Op::decode(0x0123), None);
        assert_eq!(Op::decode(0x5121), None);
        assert_eq!(Op::decode(0x8128), None);
        assert_eq!(Op::decode(0x9121), None);
        assert_eq!(Op::decode(0xE1FF), None);
        assert_eq!(Op::decode(0xF1FF), None);
    }
}
