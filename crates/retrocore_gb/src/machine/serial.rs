use super::{io, Mmu};

/// Minimal serial port: only captures bytes that software sends with the
/// internal clock, which is how test ROMs print their results.
#[derive(Clone, Debug, Default)]
pub struct Serial {
    output: Vec<u8>,
}

impl Serial {
    pub fn new() -> Self {
        Self::default()
    }

    /// SC (FF02) write. Starting a transfer (bit 7) on the internal clock
    /// (bit 0) appends SB to the output and completes immediately.
    pub fn write_sc(&mut self, mmu: &mut Mmu, value: u8) {
        if value & 0x81 == 0x81 {
            let byte = mmu.read(io::SB);
            self.output.push(byte);
            log::trace!("GB serial: {:#04x}", byte);
            mmu.write(io::SC, value & !0x80);
        } else {
            mmu.write(io::SC, value);
        }
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn clear(&mut self) {
        self.output.clear();
    }
}
