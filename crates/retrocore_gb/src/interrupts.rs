/// Interrupt enable register.
pub const IE_ADDR: u16 = 0xFFFF;
/// Interrupt flag register.
pub const IF_ADDR: u16 = 0xFF0F;

bitflags::bitflags! {
    /// Bits shared by IE ($FFFF) and IF ($FF0F).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct InterruptFlags: u8 {
        const VBLANK = 1 << 0;
        const LCD    = 1 << 1;
        const TIMER  = 1 << 2;
        const SERIAL = 1 << 3;
        const JOYPAD = 1 << 4;
    }
}
