use crate::cpu::{Bus, Cpu};

impl Cpu {
    /// STOP is a 2-byte instruction; the padding byte is fetched and
    /// discarded. Low-power mode is not modelled, so it behaves like NOP.
    pub(super) fn exec_stop<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let _padding = self.fetch8(bus);
        log::debug!("GB CPU: STOP at PC=0x{:04X}", self.regs.pc.wrapping_sub(2));
        4
    }

    pub(super) fn exec_di(&mut self) -> u32 {
        self.ime = false;
        self.ime_enable_pending = false;
        4
    }

    pub(super) fn exec_ei(&mut self) -> u32 {
        // IME becomes 1 after the next instruction completes.
        self.ime_enable_pending = true;
        4
    }
}
