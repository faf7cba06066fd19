use retrocore_common::Color;

use crate::interrupts::InterruptFlags;
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

use super::{io, Mmu};

const BYTES_PER_PIXEL: usize = 4;
pub const FRAMEBUFFER_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT * BYTES_PER_PIXEL;

/// First line of the vertical blank period.
const VBLANK_START_LINE: u8 = 144;
const LAST_LINE: u8 = 153;

/// STAT bits owned by the PPU: coincidence flag and mode.
const STAT_READ_ONLY: u8 = 0x07;
/// STAT interrupt-select bits, the only ones the CPU can change.
const STAT_WRITABLE: u8 = 0x78;
/// STAT bit 7 is unused and reads as 1.
const STAT_UNUSED: u8 = 0x80;

/// CPU write to STAT. Mode and coincidence bits are kept.
pub fn write_stat(mmu: &mut Mmu, value: u8) {
    let stat = mmu.read(io::STAT);
    mmu.write(io::STAT, STAT_UNUSED | (value & STAT_WRITABLE) | (stat & STAT_READ_ONLY));
}

/// CPU write to LYC. The coincidence bit is re-evaluated against LY.
pub fn write_lyc(mmu: &mut Mmu, value: u8) {
    mmu.write(io::LYC, value);
    let stat = mmu.read(io::STAT);
    let coincidence = if mmu.read(io::LY) == value { 0x04 } else { 0 };
    mmu.write(io::STAT, (stat & !0x04) | coincidence);
}

/// Classic green DMG shades, lightest first.
const PALETTE: [Color; 4] = [
    Color::new_rgb(155, 188, 15),
    Color::new_rgb(139, 172, 15),
    Color::new_rgb(48, 98, 48),
    Color::new_rgb(15, 56, 15),
];

/// PPU mode, numbered as reported in STAT bits 0-1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PpuMode {
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    Drawing = 3,
}

impl PpuMode {
    /// T-cycles spent in this mode (per line for VBlank).
    pub const fn cycles(self) -> u32 {
        match self {
            PpuMode::OamScan => 80,
            PpuMode::Drawing => 172,
            PpuMode::HBlank => 204,
            PpuMode::VBlank => 456,
        }
    }
}

/// Background-only scanline renderer driven by CPU cycle counts.
pub struct Ppu {
    framebuffer: Vec<u8>,
    /// Cycles accumulated in the current mode.
    mode_cycles: u32,
    line: u8,
    mode: PpuMode,
    frame_ready: bool,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            framebuffer: vec![0xFF; FRAMEBUFFER_SIZE],
            mode_cycles: 0,
            line: 0,
            mode: PpuMode::OamScan,
            frame_ready: false,
        }
    }

    pub fn reset(&mut self) {
        self.framebuffer.fill(0xFF);
        self.mode_cycles = 0;
        self.line = 0;
        self.mode = PpuMode::OamScan;
        self.frame_ready = false;
        log::debug!("GB PPU: reset");
    }

    /// Mirror the current line and mode into LY and STAT, keeping the
    /// interrupt-select bits.
    pub fn sync_registers(&self, mmu: &mut Mmu) {
        mmu.write(io::LY, self.line);
        let stat = mmu.read(io::STAT);
        let coincidence = if mmu.read(io::LYC) == self.line { 0x04 } else { 0 };
        mmu.write(
            io::STAT,
            STAT_UNUSED | (stat & STAT_WRITABLE) | coincidence | self.mode as u8,
        );
    }

    pub fn mode(&self) -> PpuMode {
        self.mode
    }

    /// Current scanline (0-153).
    pub fn line(&self) -> u8 {
        self.line
    }

    pub fn frame_ready(&self) -> bool {
        self.frame_ready
    }

    pub fn clear_frame_ready(&mut self) {
        self.frame_ready = false;
    }

    /// RGBA, 160x144.
    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    /// Advance by the T-cycle cost of the instruction just executed. A large
    /// `cycles` value may cross several mode boundaries.
    pub fn step(&mut self, mmu: &mut Mmu, cycles: u32) {
        self.mode_cycles += cycles;

        while self.mode_cycles >= self.mode.cycles() {
            self.mode_cycles -= self.mode.cycles();
            match self.mode {
                PpuMode::OamScan => self.enter_mode(mmu, PpuMode::Drawing),
                PpuMode::Drawing => {
                    self.render_scanline(mmu);
                    self.enter_mode(mmu, PpuMode::HBlank);
                }
                PpuMode::HBlank => {
                    self.set_line(mmu, self.line + 1);
                    if self.line == VBLANK_START_LINE {
                        self.enter_mode(mmu, PpuMode::VBlank);
                        self.frame_ready = true;
                        mmu.request_interrupt(InterruptFlags::VBLANK);
                    } else {
                        self.enter_mode(mmu, PpuMode::OamScan);
                    }
                }
                PpuMode::VBlank => {
                    if self.line == LAST_LINE {
                        self.set_line(mmu, 0);
                        self.enter_mode(mmu, PpuMode::OamScan);
                    } else {
                        self.set_line(mmu, self.line + 1);
                    }
                }
            }
        }
    }

    fn enter_mode(&mut self, mmu: &mut Mmu, mode: PpuMode) {
        self.mode = mode;
        let stat = mmu.read(io::STAT);
        mmu.write(io::STAT, (stat & !0x03) | mode as u8);
    }

    /// Update LY and the LY==LYC coincidence bit (STAT bit 2).
    fn set_line(&mut self, mmu: &mut Mmu, line: u8) {
        self.line = line;
        mmu.write(io::LY, line);
        let stat = mmu.read(io::STAT);
        let coincidence = if mmu.read(io::LYC) == line { 0x04 } else { 0 };
        mmu.write(io::STAT, (stat & !0x04) | coincidence);
    }

    /// Draw the background layer for the current line. Nothing is drawn
    /// while the LCD is off (LCDC bit 7).
    fn render_scanline(&mut self, mmu: &Mmu) {
        let lcdc = mmu.read(io::LCDC);
        if lcdc & 0x80 == 0 {
            return;
        }
        let line = self.line as usize;
        if line >= SCREEN_HEIGHT {
            return;
        }

        let scy = mmu.read(io::SCY);
        let scx = mmu.read(io::SCX);
        let bgp = mmu.read(io::BGP);
        let tile_map_base: u16 = if lcdc & 0x08 != 0 { 0x9C00 } else { 0x9800 };
        let unsigned_tile_data = lcdc & 0x10 != 0;

        let bg_y = self.line.wrapping_add(scy);
        let tile_row = (bg_y / 8) as u16;
        let fine_y = (bg_y % 8) as u16;

        for x in 0..SCREEN_WIDTH {
            let bg_x = (x as u8).wrapping_add(scx);
            let tile_col = (bg_x / 8) as u16;
            let tile_index = mmu.read(tile_map_base + tile_row * 32 + tile_col);

            let tile_addr = if unsigned_tile_data {
                0x8000 + tile_index as u16 * 16
            } else {
                // Signed index, tile 0 at 0x9000.
                0x8800 + ((tile_index as i8 as i16 + 128) as u16) * 16
            };

            let lo = mmu.read(tile_addr + fine_y * 2);
            let hi = mmu.read(tile_addr + fine_y * 2 + 1);
            let bit = 7 - (bg_x % 8);
            let color_id = (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1);
            let shade = (bgp >> (color_id * 2)) & 0x03;

            let offset = (line * SCREEN_WIDTH + x) * BYTES_PER_PIXEL;
            let dst = &mut self.framebuffer[offset..offset + BYTES_PER_PIXEL];
            PALETTE[shade as usize].write_rgba(dst);
        }
    }
}
