use crate::interrupts::InterruptFlags;

use super::{io, Mmu};

/// Timer / divider unit.
///
/// A free-running 16-bit system counter drives both DIV (its upper byte)
/// and TIMA. TIMA increments on each falling edge of the counter bit that
/// TAC selects, gated by the TAC enable bit. TIMA, TMA and TAC themselves
/// live in the MMU's IO space.
#[derive(Clone, Debug, Default)]
pub struct Timer {
    counter: u16,
    prev_counter: u16,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.counter = 0;
        self.prev_counter = 0;
    }

    /// Internal system counter.
    #[inline]
    pub fn counter(&self) -> u16 {
        self.counter
    }

    /// Counter value before the most recent `step` or DIV reset.
    #[inline]
    pub fn prev_counter(&self) -> u16 {
        self.prev_counter
    }

    /// DIV (FF04) value.
    #[inline]
    pub fn div(&self) -> u8 {
        (self.counter >> 8) as u8
    }

    /// Counter bit watched for TIMA increments, from TAC[1:0]:
    /// 00 -> bit 9 (4096 Hz), 01 -> bit 3, 10 -> bit 5, 11 -> bit 7.
    #[inline]
    fn selected_bit(tac: u8) -> u32 {
        match tac & 0x03 {
            0 => 9,
            1 => 3,
            2 => 5,
            _ => 7,
        }
    }

    /// Enable bit ANDed with the selected counter bit.
    #[inline]
    fn timer_signal(&self, tac: u8) -> bool {
        tac & 0x04 != 0 && self.counter & (1 << Self::selected_bit(tac)) != 0
    }

    /// Advance the counter by `cycles` T-cycles and apply every falling
    /// edge of the selected bit to TIMA.
    pub fn step(&mut self, mmu: &mut Mmu, cycles: u32) {
        let tac = mmu.read(io::TAC);
        let prev = self.counter as u32;
        let next = prev + cycles;

        self.prev_counter = self.counter;
        self.counter = next as u16;
        mmu.write(io::DIV, self.div());

        if tac & 0x04 == 0 {
            return;
        }

        // The selected bit falls each time the counter crosses a multiple
        // of 2^(bit+1).
        let shift = Self::selected_bit(tac) + 1;
        let edges = (next >> shift) - (prev >> shift);
        for _ in 0..edges {
            Self::increment_tima(mmu);
        }
    }

    /// DIV write: clears the counter. If the selected bit was high the
    /// reset itself is a falling edge and TIMA increments first.
    pub fn reset_div(&mut self, mmu: &mut Mmu) {
        let tac = mmu.read(io::TAC);
        if self.timer_signal(tac) {
            Self::increment_tima(mmu);
        }

        self.prev_counter = self.counter;
        self.counter = 0;
        mmu.write(io::DIV, 0);
    }

    /// TAC write. Disabling the timer or switching to a bit that is low
    /// while the old selection was high increments TIMA.
    pub fn write_tac(&mut self, mmu: &mut Mmu, value: u8) {
        let old_tac = mmu.read(io::TAC);
        let old_signal = self.timer_signal(old_tac);

        mmu.write(io::TAC, value);

        if old_signal && !self.timer_signal(value) {
            Self::increment_tima(mmu);
        }
    }

    /// TIMA += 1; an overflow reloads TMA and requests the timer interrupt.
    fn increment_tima(mmu: &mut Mmu) {
        let tima = mmu.read(io::TIMA);
        if tima == 0xFF {
            let tma = mmu.read(io::TMA);
            mmu.write(io::TIMA, tma);
            mmu.request_interrupt(InterruptFlags::TIMER);
        } else {
            mmu.write(io::TIMA, tima + 1);
        }
    }
}
