use std::path::PathBuf;

use anyhow::{Context, Result};
use retrocore::{Arch, Core, RunConfig};

const USAGE: &str = "usage: retrocore <chip8|gb> <rom> [frames] [dump.rgb]";

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let system = args.next().unwrap_or_else(|| "chip8".to_string());
    let arch: Arch = system.parse()?;

    let Some(rom_path) = args.next() else {
        eprintln!("No ROM path provided.\n{}", USAGE);
        std::process::exit(1);
    };

    let frames = match args.next() {
        Some(frames) => frames
            .parse()
            .with_context(|| format!("invalid frame count '{}'", frames))?,
        None => 60,
    };

    let config = RunConfig::builder()
        .arch(arch)
        .rom_path(rom_path)
        .frames(frames)
        .dump_path(args.next().map(PathBuf::from))
        .boot_rom_path(std::env::var_os("RETROCORE_BOOT_ROM").map(PathBuf::from))
        .build();

    let core = retrocore::run(&config)?;

    if let Core::GameBoy(gb) = &core {
        let serial = gb.serial_output();
        if !serial.is_empty() {
            println!("{}", String::from_utf8_lossy(serial));
        }
    }

    Ok(())
}
