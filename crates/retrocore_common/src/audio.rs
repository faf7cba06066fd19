/// Audio collaborator driven by the CHIP-8 sound timer.
///
/// The core only reports edges: `play_beep` when the sound timer is running
/// and nothing is audible yet, `stop_beep` when the timer reaches zero.
/// Waveform synthesis and device output belong to the implementor.
pub trait Beeper {
    fn is_playing(&self) -> bool;
    fn play_beep(&mut self);
    fn stop_beep(&mut self);
}
