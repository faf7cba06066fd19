use retrocore_common::{Beeper, Emulator, LoadError};

use crate::{
    FONTSET, FONTSET_SIZE, INSTRUCTIONS_PER_FRAME, MAX_ROM_SIZE, NUM_KEYS, NUM_REGS, RAM_SIZE,
    SCREEN_HEIGHT, SCREEN_WIDTH, STACK_SIZE, START_ADDRESS,
};

/// CHIP-8 interpreter state.
pub struct Chip8 {
    /// program counter
    pc: u16,
    ram: [u8; RAM_SIZE],
    /// display, one byte per pixel (0 or 1)
    screen: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
    /// V Registers
    v_reg: [u8; NUM_REGS],
    /// I Register
    i_reg: u16,
    /// Wraps inside `stack`; there is no overflow or underflow detection.
    stack_pointer: u8,
    stack: [u16; STACK_SIZE],
    keys: [bool; NUM_KEYS],
    /// delay timer
    delay_timer: u8,
    /// sound timer
    sound_timer: u8,
    draw_flag: bool,
    /// Pristine copy of the loaded program, restored into RAM on reset.
    rom: Vec<u8>,
    beeper: Option<Box<dyn Beeper>>,
}

impl Default for Chip8 {
    fn default() -> Self {
        let mut new_emu = Self {
            pc: START_ADDRESS,
            ram: [0; RAM_SIZE],
            screen: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
            v_reg: [0; NUM_REGS],
            i_reg: 0,
            stack_pointer: 0,
            stack: [0; STACK_SIZE],
            keys: [false; NUM_KEYS],
            delay_timer: 0,
            sound_timer: 0,
            draw_flag: false,
            rom: Vec::new(),
            beeper: None,
        };
        new_emu.ram[..FONTSET_SIZE].copy_from_slice(&FONTSET);
        new_emu
    }
}

impl Chip8 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the audio collaborator driven by the sound timer.
    pub fn set_beeper(&mut self, beeper: Box<dyn Beeper>) {
        self.beeper = Some(beeper);
    }

    fn push(&mut self, val: u16) {
        self.stack[self.stack_pointer as usize % STACK_SIZE] = val;
        self.stack_pointer = (self.stack_pointer + 1) % STACK_SIZE as u8;
    }

    fn pop(&mut self) -> u16 {
        self.stack_pointer = (self.stack_pointer + STACK_SIZE as u8 - 1) % STACK_SIZE as u8;
        self.stack[self.stack_pointer as usize]
    }

    #[inline]
    fn ram_at(&self, addr: u16) -> u8 {
        self.ram[addr as usize % RAM_SIZE]
    }

    #[inline]
    fn ram_at_mut(&mut self, addr: u16) -> &mut u8 {
        &mut self.ram[addr as usize % RAM_SIZE]
    }

    /// Fetch, decode and execute one instruction, then update the timers.
    pub fn tick(&mut self) {
        let opcode = self.fetch_opcode();
        self.execute_opcode(opcode);
        self.tick_timers();
    }

    fn fetch_opcode(&mut self) -> u16 {
        let byte1 = self.ram_at(self.pc) as u16;
        let byte2 = self.ram_at(self.pc.wrapping_add(1)) as u16;
        self.pc = self.pc.wrapping_add(2);
        byte1 << 8 | byte2
    }

    fn tick_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }
        if self.sound_timer > 0 {
            if let Some(beeper) = self.beeper.as_mut() {
                if !beeper.is_playing() {
                    beeper.play_beep();
                }
            }
            self.sound_timer -= 1;
            if self.sound_timer == 0 {
                if let Some(beeper) = self.beeper.as_mut() {
                    beeper.stop_beep();
                }
            }
        }
    }

    /// Clearing a running sound timer silences the beeper right away.
    fn set_sound_timer(&mut self, value: u8) {
        self.sound_timer = value;
        if value == 0 {
            if let Some(beeper) = self.beeper.as_mut() {
                if beeper.is_playing() {
                    beeper.stop_beep();
                }
            }
        }
    }

    pub(crate) fn execute_opcode(&mut self, op: u16) {
        let digit1 = (op & 0xF000) >> 12;
        let digit2 = (op & 0x0F00) >> 8;
        let digit3 = (op & 0x00F0) >> 4;
        let digit4 = op & 0x000F;
        match (digit1, digit2, digit3, digit4) {
            // 00E0 - CLS Clear the display
            (0, 0, 0xE, 0) => {
                self.screen = [0; SCREEN_WIDTH * SCREEN_HEIGHT];
                self.draw_flag = true;
            }
            // 00EE - RET Return from subroutine
            (0, 0, 0xE, 0xE) => self.pc = self.pop().wrapping_add(2),
            // 0NNN - machine code routine, ignored
            (0, _, _, _) => (),
            // 1NNN - JP Jump addr
            (0x1, _, _, _) => self.pc = op & 0x0FFF,
            // 2NNN - CALL Call subroutine
            (0x2, _, _, _) => {
                // The address of the CALL itself is saved; RET skips past it.
                self.push(self.pc.wrapping_sub(2));
                self.pc = op & 0x0FFF;
            }
            // 3XNN - SE Skip next if Vx == NN
            (0x3, x, _, _) => {
                if self.v_reg[x as usize] == (op & 0x00FF) as u8 {
                    self.skip();
                }
            }
            // 4XNN - SNE Skip next if Vx != NN
            (0x4, x, _, _) => {
                if self.v_reg[x as usize] != (op & 0x00FF) as u8 {
                    self.skip();
                }
            }
            // 5XY0 - SE Skip next if Vx == Vy
            (0x5, x, y, 0) => {
                if self.v_reg[x as usize] == self.v_reg[y as usize] {
                    self.skip();
                }
            }
            // 6XNN - LD Vx = NN
            (0x6, x, _, _) => self.v_reg[x as usize] = (op & 0x00FF) as u8,
            // 7XNN - ADD Vx += NN, no carry
            (0x7, x, _, _) => {
                let val = (op & 0x00FF) as u8;
                self.v_reg[x as usize] = self.v_reg[x as usize].wrapping_add(val);
            }
            // 8XY0 - LD Vx = Vy
            (0x8, x, y, 0) => self.v_reg[x as usize] = self.v_reg[y as usize],
            // 8XY1 - OR Vx |= Vy
            (0x8, x, y, 1) => self.v_reg[x as usize] |= self.v_reg[y as usize],
            // 8XY2 - AND Vx &= Vy
            (0x8, x, y, 2) => self.v_reg[x as usize] &= self.v_reg[y as usize],
            // 8XY3 - XOR Vx ^= Vy
            (0x8, x, y, 3) => self.v_reg[x as usize] ^= self.v_reg[y as usize],
            // 8XY4 - ADD Vx += Vy, VF = carry
            (0x8, x, y, 4) => {
                let (val, overflow) =
                    self.v_reg[x as usize].overflowing_add(self.v_reg[y as usize]);
                self.v_reg[x as usize] = val;
                self.v_reg[0xF] = overflow as u8;
            }
            // 8XY5 - SUB Vx -= Vy, VF = !borrow
            (0x8, x, y, 5) => {
                let (val, borrow) =
                    self.v_reg[x as usize].overflowing_sub(self.v_reg[y as usize]);
                self.v_reg[x as usize] = val;
                self.v_reg[0xF] = !borrow as u8;
            }
            // 8XY6 - SHR Vx >>= 1, VF = lsb
            (0x8, x, _, 6) => {
                let lsb = self.v_reg[x as usize] & 0x1;
                self.v_reg[x as usize] >>= 1;
                self.v_reg[0xF] = lsb;
            }
            // 8XY7 - SUBN Vx = Vy - Vx, VF = !borrow
            (0x8, x, y, 7) => {
                let (val, borrow) =
                    self.v_reg[y as usize].overflowing_sub(self.v_reg[x as usize]);
                self.v_reg[x as usize] = val;
                self.v_reg[0xF] = !borrow as u8;
            }
            // 8XYE - SHL Vx <<= 1, VF = msb
            (0x8, x, _, 0xE) => {
                let msb = (self.v_reg[x as usize] & 0x80) >> 7;
                self.v_reg[x as usize] <<= 1;
                self.v_reg[0xF] = msb;
            }
            // 9XY0 - SNE Skip next if Vx != Vy
            (0x9, x, y, 0) => {
                if self.v_reg[x as usize] != self.v_reg[y as usize] {
                    self.skip();
                }
            }
            // ANNN - LD I = addr
            (0xA, _, _, _) => self.i_reg = op & 0x0FFF,
            // BNNN - JP V0 + addr
            (0xB, _, _, _) => self.pc = (op & 0x0FFF) + self.v_reg[0] as u16,
            // CXNN - RND Vx = random byte & NN
            (0xC, x, _, _) => {
                let rand = rand::random::<u8>();
                self.v_reg[x as usize] = rand & (op & 0x00FF) as u8;
            }
            // DXYN - DRW Draw sprite at Vx, Vy, height N
            (0xD, d2, d3, height) => self.draw_sprite(d2 as usize, d3 as usize, height),
            // EX9E - SKP Skip next if key[Vx] is pressed
            (0xE, x, 9, 0xE) => {
                if self.is_key_pressed(self.v_reg[x as usize] as usize) {
                    self.skip();
                }
            }
            // EXA1 - SKNP Skip next if key[Vx] is not pressed
            (0xE, x, 0xA, 1) => {
                if !self.is_key_pressed(self.v_reg[x as usize] as usize) {
                    self.skip();
                }
            }
            // FX07 - LD Vx = DT
            (0xF, x, 0, 7) => self.v_reg[x as usize] = self.delay_timer,
            // FX0A - LD Vx = K, wait for key press
            (0xF, x, 0, 0xA) => match self.keys.iter().position(|pressed| *pressed) {
                Some(key) => self.v_reg[x as usize] = key as u8,
                // Re-run this instruction on the next step; timers keep running.
                None => self.pc = self.pc.wrapping_sub(2),
            },
            // FX15 - LD DT = Vx
            (0xF, x, 1, 5) => self.delay_timer = self.v_reg[x as usize],
            // FX18 - LD ST = Vx
            (0xF, x, 1, 8) => self.set_sound_timer(self.v_reg[x as usize]),
            // FX1E - ADD I += Vx
            (0xF, x, 1, 0xE) => self.i_reg = self.i_reg.wrapping_add(self.v_reg[x as usize] as u16),
            // FX29 - LD F, Vx; 5 bytes per font glyph
            (0xF, x, 2, 9) => self.i_reg = self.v_reg[x as usize] as u16 * 5,
            // FX33 - LD B, Vx; BCD into I, I+1, I+2
            (0xF, x, 3, 3) => {
                let val = self.v_reg[x as usize];
                let i = self.i_reg;
                *self.ram_at_mut(i) = val / 100;
                *self.ram_at_mut(i.wrapping_add(1)) = (val / 10) % 10;
                *self.ram_at_mut(i.wrapping_add(2)) = val % 10;
            }
            // FX55 - LD [I], V0..=Vx
            (0xF, x, 5, 5) => {
                let i = self.i_reg;
                for offset in 0..=x {
                    *self.ram_at_mut(i.wrapping_add(offset)) = self.v_reg[offset as usize];
                }
            }
            // FX65 - LD V0..=Vx, [I]
            (0xF, x, 6, 5) => {
                let i = self.i_reg;
                for offset in 0..=x {
                    self.v_reg[offset as usize] = self.ram_at(i.wrapping_add(offset));
                }
            }
            (_, _, _, _) => {
                log::debug!(
                    "CHIP-8: ignoring unknown opcode {:04X} at PC={:04X}",
                    op,
                    self.pc.wrapping_sub(2)
                );
            }
        }
    }

    #[inline]
    fn skip(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    /// XOR an 8-pixel-wide sprite of `height` rows from RAM[I] onto the
    /// screen. VF reports whether any lit pixel was turned off.
    fn draw_sprite(&mut self, vx: usize, vy: usize, height: u16) {
        let x_coord = self.v_reg[vx] as usize % SCREEN_WIDTH;
        let y_coord = self.v_reg[vy] as usize % SCREEN_HEIGHT;
        let mut collision = false;

        for row in 0..height {
            let pixels = self.ram_at(self.i_reg.wrapping_add(row));
            for col in 0..8 {
                if (pixels >> (7 - col)) & 0x1 == 0 {
                    continue;
                }
                let x = (x_coord + col) % SCREEN_WIDTH;
                let y = (y_coord + row as usize) % SCREEN_HEIGHT;
                let screen_pixel = &mut self.screen[x + y * SCREEN_WIDTH];
                if *screen_pixel == 1 {
                    collision = true;
                }
                *screen_pixel ^= 1;
            }
        }

        self.v_reg[0xF] = collision as u8;
        self.draw_flag = true;
    }

    fn is_key_pressed(&self, key: usize) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    pub fn get_display(&self) -> &[u8; SCREEN_WIDTH * SCREEN_HEIGHT] {
        &self.screen
    }

    /// Returns whether the screen changed since the last call.
    pub fn take_draw_flag(&mut self) -> bool {
        std::mem::take(&mut self.draw_flag)
    }

    pub fn set_key(&mut self, idx: usize, pressed: bool) {
        if let Some(key) = self.keys.get_mut(idx) {
            *key = pressed;
        }
    }

    pub fn registers(&self) -> &[u8; NUM_REGS] {
        &self.v_reg
    }

    pub fn index(&self) -> u16 {
        self.i_reg
    }

    pub fn keypad(&self) -> &[bool; NUM_KEYS] {
        &self.keys
    }

    pub fn stack(&self) -> &[u16; STACK_SIZE] {
        &self.stack
    }

    pub fn stack_pointer(&self) -> u8 {
        self.stack_pointer
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }
}

impl Emulator for Chip8 {
    fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.len() > MAX_ROM_SIZE {
            log::warn!(
                "CHIP-8: ROM too large: {} bytes (max: {})",
                rom.len(),
                MAX_ROM_SIZE
            );
            return Err(LoadError::RomTooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }

        self.rom = rom.to_vec();
        self.reset();
        log::info!("CHIP-8: loaded {} byte ROM", rom.len());
        Ok(())
    }

    fn reset(&mut self) {
        self.pc = START_ADDRESS;
        self.ram = [0; RAM_SIZE];
        self.ram[..FONTSET_SIZE].copy_from_slice(&FONTSET);
        let start = START_ADDRESS as usize;
        self.ram[start..start + self.rom.len()].copy_from_slice(&self.rom);
        self.screen = [0; SCREEN_WIDTH * SCREEN_HEIGHT];
        self.v_reg = [0; NUM_REGS];
        self.i_reg = 0;
        self.stack_pointer = 0;
        self.stack = [0; STACK_SIZE];
        self.keys = [false; NUM_KEYS];
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.draw_flag = false;
        if let Some(beeper) = self.beeper.as_mut() {
            if beeper.is_playing() {
                beeper.stop_beep();
            }
        }
        log::debug!("CHIP-8: reset");
    }

    fn step(&mut self) {
        self.tick();
    }

    fn run_frame(&mut self) {
        for _ in 0..INSTRUCTIONS_PER_FRAME {
            self.tick();
        }
    }

    fn framebuffer(&self) -> &[u8] {
        &self.screen
    }

    fn screen_width(&self) -> usize {
        SCREEN_WIDTH
    }

    fn screen_height(&self) -> usize {
        SCREEN_HEIGHT
    }

    fn set_button(&mut self, index: usize, pressed: bool) {
        self.set_key(index, pressed);
    }

    fn arch_name(&self) -> &'static str {
        "CHIP-8"
    }

    fn memory(&self) -> &[u8] {
        &self.ram
    }

    fn pc(&self) -> u16 {
        self.pc
    }
}
