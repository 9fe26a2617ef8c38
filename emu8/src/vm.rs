//! Virtual machine.
use log::{debug, error};
use rand::prelude::*;

use crate::{
    clock::{Clock, Hz, TimerDivider},
    constants::*,
    cpu::Chip8Cpu,
    display::DisplayBuffer,
    error::{Chip8Error, Chip8Result},
    keypad::Keypad,
    op::Op,
};

pub struct Chip8Vm {
    cpu: Chip8Cpu,
    clock: Clock,
    divider: TimerDivider,
    rng: StdRng,
    conf: Chip8Conf,
}

/// VM Configuration Parameters.
#[derive(Debug, Clone)]
pub struct Chip8Conf {
    /// Instructions executed per second.
    pub clock_frequency: Hz,
    /// Sleep after each step so the VM runs at `clock_frequency`.
    /// When turned off the interpreter runs as quickly as possible,
    /// though the timers still count down per executed instruction.
    pub throttle: bool,
    /// Seed for the random number generator used by `RND`.
    /// Seeded from system entropy when `None`.
    pub rng_seed: Option<u64>,
}

impl Default for Chip8Conf {
    fn default() -> Self {
        Self {
            clock_frequency: Hz::default(),
            throttle: true,
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Flow {
    Ok,
    /// Program counter has jumped to a new address.
    ///
    /// This is returned when the interpreter encounters:
    ///
    /// - 1nnn (`JP addr`)
    /// - 2nnn (`CALL addr`)
    /// - 00EE (`RET`)
    /// - Bnnn (`JP V0, addr`)
    Jump,
    /// Display buffer was changed.
    Draw,
    /// Sound timer was loaded.
    Sound,
    /// Wait for a keypress.
    ///
    /// This is triggered by the opcode `Fx0A` (`LD Vx, K`), which stops
    /// execution until a key is pressed, and loads the key value into `Vx`.
    /// The caller must keep stepping the VM for it to observe the keypress.
    KeyWait,
    /// The program counter reached the `0000` sentinel and the program is done.
    Halt,
}

/// Independent copy of the complete machine state.
///
/// Taken with [`Chip8Vm::snapshot`] and put back with [`Chip8Vm::restore`].
/// Nothing is shared with the live machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    cpu: Chip8Cpu,
    cycles: usize,
}

impl Snapshot {
    pub fn cpu(&self) -> &Chip8Cpu {
        &self.cpu
    }
}

impl Default for Chip8Vm {
    fn default() -> Self {
        Self::new(Chip8Conf::default())
    }
}

impl Chip8Vm {
    pub fn new(conf: Chip8Conf) -> Self {
        let rng = match conf.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut cpu = Chip8Cpu::new();
        cpu.reset();

        Chip8Vm {
            cpu,
            clock: Clock::new(conf.clock_frequency),
            divider: TimerDivider::new(conf.clock_frequency),
            rng,
            conf,
        }
    }

    /// Configuration that was used to instantiate the VM.
    pub fn config(&self) -> &Chip8Conf {
        &self.conf
    }

    pub fn clock_frequency(&self) -> Hz {
        self.conf.clock_frequency
    }

    /// Change the CPU clock. The timers keep counting down at 60Hz.
    pub fn set_clock_frequency(&mut self, freq: Hz) {
        self.conf.clock_frequency = freq;
        self.clock.set_frequency(freq);
        self.divider.set_frequency(freq);
    }

    /// Number of instructions executed per timer count down.
    pub fn timer_ratio(&self) -> usize {
        self.divider.ratio()
    }

    /// Load a raw program image at `MEM_START`.
    ///
    /// All machine state is reset first, so nothing leaks over from a
    /// previously loaded program.
    pub fn load_program(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        if bytecode.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::LargeProgram);
        }

        self.cpu.reset();
        self.divider.reset();

        // Load program into virtual RAM
        self.cpu.ram[MEM_START..MEM_START + bytecode.len()].copy_from_slice(bytecode);

        debug!("loaded program of {} bytes", bytecode.len());

        Ok(())
    }

    pub fn cpu(&self) -> &Chip8Cpu {
        &self.cpu
    }

    pub fn display(&self) -> &DisplayBuffer {
        &self.cpu.display
    }

    pub fn ram(&self) -> &[u8; MEM_SIZE] {
        &self.cpu.ram
    }

    /// Memory surrounding the program counter, `radius` bytes on each side.
    ///
    /// Addresses wrap around the ends of memory.
    pub fn memory_window(&self, radius: usize) -> impl Iterator<Item = (Address, u8)> + '_ {
        let radius = radius.min(MEM_SIZE / 2 - 1);
        let first = self.cpu.pc + MEM_SIZE - radius;
        (0..=radius * 2).map(move |offset| {
            let addr = (first + offset) & ADDRESS_MASK;
            (addr as Address, self.cpu.ram[addr])
        })
    }

    /// Whether the next instruction is the program termination sentinel.
    pub fn is_halted(&self) -> bool {
        self.cpu.instr_word() == HALT_WORD
    }

    /// Take an independent copy of the machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cpu: self.cpu.clone(),
            cycles: self.divider.cycles(),
        }
    }

    /// Replace the machine state with a previously taken snapshot.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.cpu = snapshot.cpu;
        self.divider.set_cycles(snapshot.cycles);
    }
}

/// Input
impl Chip8Vm {
    /// Replace the keyboard state with the given pressed keys.
    pub fn set_input(&mut self, keys: impl Into<Keypad>) {
        self.cpu.keys = keys.into();
    }

    /// Sets the keyboard key input state.
    pub fn set_key(&mut self, key_id: u8, pressed: bool) -> Chip8Result<()> {
        self.cpu.keys.set(key_id, pressed)
    }

    /// Clear the keyboard input state, setting all keys to up.
    pub fn clear_keys(&mut self) {
        self.cpu.keys.clear()
    }
}

/// Interpreter
impl Chip8Vm {
    /// Execute up to `step_count` instructions, stopping early when the
    /// program halts.
    pub fn run_steps(&mut self, step_count: usize) -> Chip8Result<Flow> {
        let mut flow = Flow::Ok;

        for _ in 0..step_count {
            flow = self.step()?;
            if flow == Flow::Halt {
                break;
            }
        }

        Ok(flow)
    }

    /// Execute exactly one instruction.
    ///
    /// When throttled, the call doesn't return until a full clock period
    /// has passed since it started.
    pub fn step(&mut self) -> Chip8Result<Flow> {
        let address = self.cpu.pc;
        let word = self.cpu.instr_word();
        if word == HALT_WORD {
            return Ok(Flow::Halt);
        }

        if self.conf.throttle {
            self.clock.start();
        }

        let op = match Op::decode(word) {
            Some(Op::Halt) => return Ok(Flow::Halt),
            Some(op) => op,
            None => {
                let err = Chip8Error::UnknownOpcode {
                    opcode: word,
                    address: address as Address,
                };
                error!("{err}");
                return Err(err);
            }
        };

        op_trace(address, word, &op);

        let flow = match self.exec(address, op) {
            Ok(flow) => flow,
            Err(err) => {
                error!("{err}");
                return Err(err);
            }
        };

        // Count down timers
        if self.divider.tick() {
            self.cpu.tick_timers();
        }

        if self.conf.throttle {
            self.clock.wait();
        }

        Ok(flow)
    }

    /// Apply the operation located at `address` to the machine state.
    ///
    /// Errors are raised before any state is modified.
    fn exec(&mut self, address: usize, op: Op) -> Chip8Result<Flow> {
        let cpu = &mut self.cpu;

        let mut control_flow = Flow::Ok;
        let mut next = address + 2;

        match op {
            Op::Halt => return Ok(Flow::Halt),
            // ----------------------------------------------------------------
            // Control flow
            Op::ClearScreen => {
                cpu.display.clear();
                control_flow = Flow::Draw;
            }
            // The stack holds the address of the CALL instruction itself,
            // so the return skips over it.
            Op::Return => {
                if cpu.sp == 0 {
                    return Err(Chip8Error::StackUnderflow {
                        address: address as Address,
                    });
                }
                cpu.sp -= 1;
                next = cpu.stack[cpu.sp] as usize + 2;
                control_flow = Flow::Jump;
            }
            Op::Jump { address } => {
                next = address as usize;
                control_flow = Flow::Jump;
            }
            Op::Call { address: target } => {
                if cpu.sp >= STACK_SIZE {
                    return Err(Chip8Error::StackOverflow {
                        address: address as Address,
                    });
                }
                cpu.stack[cpu.sp] = address as Address;
                cpu.sp += 1;
                next = target as usize;
                control_flow = Flow::Jump;
            }
            Op::Jump_V0 { address } => {
                next = address as usize + cpu.registers[0] as usize;
                control_flow = Flow::Jump;
            }
            Op::Load_Address { address } => {
                cpu.address = address;
            }
            // ----------------------------------------------------------------
            // Skips
            Op::Skip_Eq_Byte { vx, nn } => {
                if cpu.register(vx) == nn {
                    next += 2;
                }
            }
            Op::Skip_NotEq_Byte { vx, nn } => {
                if cpu.register(vx) != nn {
                    next += 2;
                }
            }
            Op::Skip_Eq { vx, vy } => {
                if cpu.register(vx) == cpu.register(vy) {
                    next += 2;
                }
            }
            Op::Skip_NotEq { vx, vy } => {
                if cpu.register(vx) != cpu.register(vy) {
                    next += 2;
                }
            }
            Op::Skip_Key { vx } => {
                if cpu.keys.is_pressed(cpu.register(vx)) {
                    next += 2;
                }
            }
            Op::Skip_NotKey { vx } => {
                if !cpu.keys.is_pressed(cpu.register(vx)) {
                    next += 2;
                }
            }
            // ----------------------------------------------------------------
            // Register and byte
            Op::Load_Byte { vx, nn } => {
                cpu.registers[vx as usize] = nn;
            }
            Op::Add_Byte { vx, nn } => {
                let x = cpu.registers[vx as usize];
                cpu.registers[vx as usize] = x.wrapping_add(nn);
            }
            Op::Random { vx, nn } => {
                cpu.registers[vx as usize] = nn & self.rng.gen::<u8>();
            }
            // ----------------------------------------------------------------
            // Arithmetic
            Op::Load_Vx_Vy { .. }
            | Op::Or_Vx_Vy { .. }
            | Op::And_Vx_Vy { .. }
            | Op::Xor_Vx_Vy { .. }
            | Op::Add_Vx_Vy { .. }
            | Op::Sub_Vx_Vy { .. }
            | Op::ShiftRight { .. }
            | Op::SubReverse_Vx_Vy { .. }
            | Op::ShiftLeft { .. } => exec_math(cpu, op),
            // ----------------------------------------------------------------
            // Dxyn (DRW Vx, Vy, nibble)
            //
            // If the drawing operation erases existing pixels in the display buffer, register VF is set to
            // 1, and set to 0 if no display bits are unset. This is used for collision detection.
            Op::Draw { vx, vy, n } => {
                let (x, y) = (cpu.register(vx) as usize, cpu.register(vy) as usize);
                let start = cpu.address as usize;
                let ram = &cpu.ram;
                let sprite = (0..n as usize).map(|r| ram[(start + r) & ADDRESS_MASK]);

                let is_erased = cpu.display.draw_sprite(x, y, sprite);

                cpu.registers[FLAG_REGISTER] = is_erased as u8;
                control_flow = Flow::Draw;
            }
            // ----------------------------------------------------------------
            // Timers and keys
            Op::Load_Vx_Delay { vx } => {
                cpu.registers[vx as usize] = cpu.delay_timer;
            }
            // Busy poll. The program counter stays on this instruction
            // until a key is down when it executes.
            Op::Wait_Key { vx } => match cpu.keys.first() {
                Some(k) => {
                    cpu.registers[vx as usize] = k;
                }
                None => {
                    next = address;
                    control_flow = Flow::KeyWait;
                }
            },
            Op::Load_Delay_Vx { vx } => {
                cpu.delay_timer = cpu.register(vx);
            }
            Op::Load_Sound_Vx { vx } => {
                cpu.sound_timer = cpu.register(vx);
                control_flow = Flow::Sound;
            }
            // ----------------------------------------------------------------
            // Memory
            Op::Add_Address { vx } => {
                let addr = cpu.address as usize + cpu.register(vx) as usize;
                cpu.address = (addr & ADDRESS_MASK) as Address;
            }
            Op::Load_Digit { vx } => {
                let addr = FONTSET_START + cpu.register(vx) as usize * FONTSET_HEIGHT;
                cpu.address = (addr & ADDRESS_MASK) as Address;
            }
            #[rustfmt::skip]
            Op::Store_Bcd { vx } => {
                let addr = cpu.address as usize;
                let x = cpu.register(vx);
                cpu.store(addr,     x / 100 % 10);
                cpu.store(addr + 1, x / 10  % 10);
                cpu.store(addr + 2, x       % 10);
            }
            // Registers V0 through Vx inclusive. I is left unchanged.
            Op::Store_Registers { vx } => {
                let addr = cpu.address as usize;
                for v in 0..=vx as usize {
                    let x = cpu.registers[v];
                    cpu.store(addr + v, x);
                }
            }
            Op::Load_Registers { vx } => {
                let addr = cpu.address as usize;
                for v in 0..=vx as usize {
                    cpu.registers[v] = cpu.load(addr + v);
                }
            }
        }

        cpu.jump(next);

        Ok(control_flow)
    }
}

/// Execute an arithmetic instruction.
///
/// Operands are read before anything is written, and VF is written last,
/// so when VF is the destination the flag wins.
#[inline]
fn exec_math(cpu: &mut Chip8Cpu, op: Op) {
    match op {
        Op::Load_Vx_Vy { vx, vy } => {
            cpu.registers[vx as usize] = cpu.registers[vy as usize];
        }
        Op::Or_Vx_Vy { vx, vy } => {
            cpu.registers[vx as usize] |= cpu.registers[vy as usize];
        }
        Op::And_Vx_Vy { vx, vy } => {
            cpu.registers[vx as usize] &= cpu.registers[vy as usize];
        }
        Op::Xor_Vx_Vy { vx, vy } => {
            cpu.registers[vx as usize] ^= cpu.registers[vy as usize];
        }
        Op::Add_Vx_Vy { vx, vy } => {
            let (x, y) = (cpu.registers[vx as usize], cpu.registers[vy as usize]);
            let result = x as usize + y as usize;
            cpu.registers[vx as usize] = (result & 0xFF) as u8; // Overflow wrap
            cpu.registers[FLAG_REGISTER] = (result > 0xFF) as u8;
        }
        // Flag is strictly greater-than, so equal operands clear it.
        Op::Sub_Vx_Vy { vx, vy } => {
            let (x, y) = (cpu.registers[vx as usize], cpu.registers[vy as usize]);
            cpu.registers[vx as usize] = x.wrapping_sub(y);
            cpu.registers[FLAG_REGISTER] = (x > y) as u8;
        }
        Op::SubReverse_Vx_Vy { vx, vy } => {
            let (x, y) = (cpu.registers[vx as usize], cpu.registers[vy as usize]);
            cpu.registers[vx as usize] = y.wrapping_sub(x);
            cpu.registers[FLAG_REGISTER] = (y > x) as u8;
        }
        Op::ShiftRight { vx } => {
            let x = cpu.registers[vx as usize];
            cpu.registers[vx as usize] = x >> 1;
            cpu.registers[FLAG_REGISTER] = x & 1;
        }
        Op::ShiftLeft { vx } => {
            let x = cpu.registers[vx as usize];
            cpu.registers[vx as usize] = x << 1;
            cpu.registers[FLAG_REGISTER] = (x > 0x7F) as u8;
        }
        _ => unreachable!("not an arithmetic operation: {op:?}"),
    }
}

#[cfg(feature = "op_trace")]
#[inline]
fn op_trace(address: usize, word: u16, op: &Op) {
    log::trace!("{address:04X}: {word:04X} {op:?}");
}

#[cfg(not(feature = "op_trace"))]
#[inline]
fn op_trace(_: usize, _: u16, _: &Op) {}

#[cfg(test)]
mod test {
    use super::*;

    fn vm_with(bytecode: &[u8]) -> Chip8Vm {
        let mut vm = Chip8Vm::new(Chip8Conf {
            throttle: false,
            rng_seed: Some(8),
            ..Chip8Conf::default()
        });
        vm.load_program(bytecode).unwrap();
        vm
    }

    /// Fx0A (LD Vx, K)
    ///
    /// Wait for a keypress, then store the key value in Vx.
    /// The VM must stall while waiting, and signal the state to the outer executer.
    #[test]
    #[rustfmt::skip]
    fn test_key_wait() {
        let mut vm = vm_with(&[
            0xF1, 0x0A, // LD v1, K
            0x62, 0x42  // LD v2, 0x42  ; sentinal
        ]);

        // machine must stall
        for _ in 0..6 {
            assert_eq!(vm.step(), Ok(Flow::KeyWait));
            assert_eq!(vm.cpu.pc, MEM_START);
        }

        // machine has yielded, waiting for any key to be pressed.
        vm.set_key(0x5, true).unwrap();

        // machine will now advance
        vm.step().unwrap();
        assert_eq!(vm.cpu.pc, MEM_START + 2);
        assert_eq!(vm.cpu.registers[1], 0x05);

        // Ensure the machine is continuing
        vm.step().unwrap();
        assert_eq!(vm.cpu.pc, MEM_START + 4);
        assert_eq!(vm.cpu.registers[2], 0x42); // sentinal
    }

    #[test]
    fn test_throttle_covers_whole_step() {
        use std::time::{Duration, Instant};

        let mut vm = Chip8Vm::new(Chip8Conf {
            clock_frequency: Hz(20),
            ..Chip8Conf::default()
        });
        vm.load_program(&[0x60, 0x01]).unwrap(); // LD v0, 1

        let start = Instant::now();
        assert_eq!(vm.step(), Ok(Flow::Ok));
        assert!(start.elapsed() >= Duration::from_millis(50));

        // Halt returns without waiting out a period.
        let start = Instant::now();
        assert_eq!(vm.step(), Ok(Flow::Halt));
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    #[rustfmt::skip]
    fn test_draw_collision_sets_flag_to_one() {
        let mut vm = vm_with(&[
            0x6F, 0x42, // LD vF, 0x42
            0xA0, 0x00, // LD I, 0x000 ; digit 0
            0xD0, 0x05, // DRW v0, v0, 5
            0xD0, 0x05, // DRW v0, v0, 5
        ]);

        vm.run_steps(3).unwrap();
        assert_eq!(vm.cpu.registers[0xF], 0);
        vm.step().unwrap();
        assert_eq!(vm.cpu.registers[0xF], 1);
        assert_eq!(vm.display().lit(), 0);
    }

    #[test]
    #[rustfmt::skip]
    fn test_draw_collision() {
        // Draw two sprites next to each other.
        // The zero bits of the second draw must not erase
        // the pixels of the first draw
        //
        // draw sprite 1
        // ____####, vf == 0
        //
        // draw sprite 2
        // ########, vf == 0
        let mut vm = vm_with(&[
            0xA2, 0x0C, // LD I, .sprite
            0x60, 0x04, // LD v0, 4
            0x61, 0x00, // LD v1, 0
            0xD0, 0x11, // DRW v0, v1, 1
            0x60, 0x00, // LD v0, 0
            0xD0, 0x11, // DRW v0, v1, 1
            // .sprite
            0b11110000,
            0b00000000,
        ]);

        vm.run_steps(6).unwrap();

        assert!(vm.display().get(0, 0)); // sprite 2
        assert!(vm.display().get(4, 0)); // sprite 1
        assert!(!vm.display().get(8, 0));
        assert_eq!(vm.cpu.registers[0xF], 0);
    }

    #[test]
    #[rustfmt::skip]
    fn test_draw_collision_clears_flag() {
        let mut vm = vm_with(&[
            0x6F, 0x01, // LD vF, 1
            0xA0, 0x00, // LD I, 0x000 ; digit 0
            0xD0, 0x05, // DRW v0, v0, 5
        ]);

        assert_eq!(vm.run_steps(3), Ok(Flow::Draw));
        assert_eq!(vm.cpu.registers[0xF], 0);
        assert_eq!(vm.display().lit(), 14);
    }

    #[test]
    #[rustfmt::skip]
    fn test_call_return() {
        let mut vm = vm_with(&[
            0x22, 0x06, // 200: CALL 0x206
            0x61, 0x01, // 202: LD v1, 1
            0x00, 0x00, // 204: halt
            0x60, 0x07, // 206: LD v0, 7
            0x00, 0xEE, // 208: RET
        ]);

        assert_eq!(vm.step(), Ok(Flow::Jump));
        assert_eq!(vm.cpu.pc, 0x206);
        assert_eq!(vm.cpu.stack(), &[0x200]);

        assert_eq!(vm.run_steps(10), Ok(Flow::Halt));
        assert_eq!(vm.cpu.pc, 0x204);
        assert_eq!(vm.cpu.registers[0], 7);
        assert_eq!(vm.cpu.registers[1], 1);
        assert_eq!(vm.cpu.sp, 0);
    }

    #[test]
    fn test_stack_overflow() {
        // Calls itself forever.
        let mut vm = vm_with(&[0x22, 0x00]);

        for depth in 1..=STACK_SIZE {
            vm.step().unwrap();
            assert_eq!(vm.cpu.sp, depth);
        }

        let before = vm.snapshot();
        assert_eq!(
            vm.step(),
            Err(Chip8Error::StackOverflow { address: 0x200 })
        );
        assert_eq!(vm.snapshot(), before);
    }

    #[test]
    fn test_stack_underflow() {
        let mut vm = vm_with(&[0x00, 0xEE]);

        assert_eq!(
            vm.step(),
            Err(Chip8Error::StackUnderflow { address: 0x200 })
        );
        assert_eq!(vm.cpu.pc, MEM_START);
    }

    #[test]
    fn test_unknown_opcode() {
        let mut vm = vm_with(&[0x60, 0x01, 0x51, 0x23]);

        vm.step().unwrap();
        assert_eq!(
            vm.step(),
            Err(Chip8Error::UnknownOpcode {
                opcode: 0x5123,
                address: 0x202
            })
        );
        assert_eq!(vm.cpu.pc, 0x202);
    }

    #[test]
    fn test_halt_has_no_side_effects() {
        let mut vm = vm_with(&[]);
        vm.cpu.delay_timer = 5;

        for _ in 0..32 {
            assert_eq!(vm.step(), Ok(Flow::Halt));
        }
        assert!(vm.is_halted());
        assert_eq!(vm.cpu.pc, MEM_START);
        assert_eq!(vm.cpu.delay_timer, 5);
        assert_eq!(vm.divider.cycles(), 0);
    }

    #[test]
    #[rustfmt::skip]
    fn test_jump_with_offset() {
        let mut vm = vm_with(&[
            0x60, 0x10, // LD v0, 0x10
            0xB3, 0x00, // JP v0, 0x300
        ]);

        vm.run_steps(2).unwrap();
        assert_eq!(vm.cpu.pc, 0x310);

        // Wraps into the 12-bit address space.
        let mut vm = vm_with(&[
            0x60, 0x10, // LD v0, 0x10
            0xBF, 0xF8, // JP v0, 0xFF8
        ]);
        vm.run_steps(2).unwrap();
        assert_eq!(vm.cpu.pc, 0x008);
    }

    #[test]
    #[rustfmt::skip]
    fn test_skip_advances_four() {
        let mut vm = vm_with(&[
            0x60, 0x05, // LD v0, 5
            0x30, 0x05, // SE v0, 5
            0x00, 0x00,
            0x40, 0x05, // SNE v0, 5
            0x61, 0x05, // LD v1, 5
            0x50, 0x10, // SE v0, v1
            0x00, 0x00,
            0x90, 0x10, // SNE v0, v1
            0x00, 0x00,
        ]);

        let pcs: Vec<usize> = (0..6)
            .map(|_| {
                vm.step().unwrap();
                vm.cpu.pc
            })
            .collect();
        assert_eq!(pcs, vec![0x202, 0x206, 0x208, 0x20A, 0x20E, 0x210]);
        assert_eq!(vm.step(), Ok(Flow::Halt));
    }

    #[test]
    #[rustfmt::skip]
    fn test_skip_on_key() {
        let mut vm = vm_with(&[
            0x60, 0x13, // LD v0, 0x13 ; aliases key 3
            0xE0, 0x9E, // SKP v0
            0xE0, 0xA1, // SKNP v0
            0xE0, 0xA1, // SKNP v0
        ]);
        vm.set_key(0x3, true).unwrap();

        vm.run_steps(2).unwrap();
        assert_eq!(vm.cpu.pc, 0x206);
        vm.step().unwrap();
        assert_eq!(vm.cpu.pc, 0x208);
    }

    #[test]
    #[rustfmt::skip]
    fn test_bcd_and_register_transfer() {
        let mut vm = vm_with(&[
            0x60, 0xFE, // LD v0, 254
            0xA3, 0x00, // LD I, 0x300
            0xF0, 0x33, // LD B, v0
            0xF2, 0x65, // LD v2, [I]
        ]);

        vm.run_steps(4).unwrap();
        assert_eq!(&vm.ram()[0x300..0x303], &[2, 5, 4]);
        assert_eq!(&vm.cpu.registers[0..4], &[2, 5, 4, 0]);
        assert_eq!(vm.cpu.address, 0x300);
    }

    #[test]
    #[rustfmt::skip]
    fn test_store_registers_inclusive() {
        let mut vm = vm_with(&[
            0x60, 0x0A, // LD v0, 10
            0x61, 0x0B, // LD v1, 11
            0x62, 0x0C, // LD v2, 12
            0xA3, 0x00, // LD I, 0x300
            0xF1, 0x55, // LD [I], v1
        ]);

        vm.run_steps(5).unwrap();
        assert_eq!(&vm.ram()[0x300..0x303], &[10, 11, 0]);
        assert_eq!(vm.cpu.address, 0x300);
    }

    #[test]
    #[rustfmt::skip]
    fn test_digit_sprite_and_add_address() {
        let mut vm = vm_with(&[
            0x61, 0x0A, // LD v1, 0xA
            0xF1, 0x29, // LD F, v1
            0x62, 0xFF, // LD v2, 255
            0xAF, 0xFF, // LD I, 0xFFF
            0xF2, 0x1E, // ADD I, v2
        ]);

        vm.run_steps(2).unwrap();
        assert_eq!(vm.cpu.address, 50);

        vm.run_steps(3).unwrap();
        assert_eq!(vm.cpu.address, (0xFFF + 0xFF) & 0xFFF);
        assert_eq!(vm.cpu.registers[0xF], 0);
    }

    #[test]
    #[rustfmt::skip]
    fn test_flag_destination() {
        let mut vm = vm_with(&[
            0x6F, 0xF0, // LD vF, 0xF0
            0x61, 0x20, // LD v1, 0x20
            0x8F, 0x14, // ADD vF, v1
        ]);

        vm.run_steps(3).unwrap();
        // The carry overwrites the sum.
        assert_eq!(vm.cpu.registers[0xF], 1);
    }

    #[test]
    #[rustfmt::skip]
    fn test_random_is_masked() {
        let mut vm = vm_with(&[
            0xC0, 0x0F, // RND v0, 0x0F
            0xC1, 0x00, // RND v1, 0x00
        ]);

        vm.run_steps(2).unwrap();
        assert_eq!(vm.cpu.registers[0] & 0xF0, 0);
        assert_eq!(vm.cpu.registers[1], 0);
    }

    #[test]
    fn test_sound_timer() {
        let mut vm = vm_with(&[0x60, 0x03, 0xF0, 0x18]);

        vm.step().unwrap();
        assert_eq!(vm.step(), Ok(Flow::Sound));
        assert!(vm.cpu.buzzer());
    }

    #[test]
    fn test_large_program() {
        let mut vm = Chip8Vm::default();
        let rom = vec![0x12; MAX_PROGRAM_SIZE + 1];
        assert_eq!(vm.load_program(&rom), Err(Chip8Error::LargeProgram));

        let rom = vec![0x12; MAX_PROGRAM_SIZE];
        assert!(vm.load_program(&rom).is_ok());
        assert_eq!(vm.ram()[MEM_SIZE - 1], 0x12);
    }

    #[test]
    fn test_memory_window_wraps() {
        let vm = vm_with(&[0xAB, 0xCD]);

        let window: Vec<(Address, u8)> = vm.memory_window(2).collect();
        assert_eq!(
            window,
            vec![(0x1FE, 0), (0x1FF, 0), (0x200, 0xAB), (0x201, 0xCD), (0x202, 0)]
        );

        let mut vm = vm_with(&[0x1F, 0xFF]);
        vm.step().unwrap();
        let addrs: Vec<Address> = vm.memory_window(1).map(|(a, _)| a).collect();
        assert_eq!(addrs, vec![0xFFE, 0xFFF, 0x000]);
    }
}
