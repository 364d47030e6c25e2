use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use chip8vm::config::{Config, KeymapKind, OpcodePolicy, DEFAULT_CPU_HZ};
use chip8vm::display::MonoTermDisplay;
use chip8vm::environment::{Environment, Exit};
use chip8vm::input::TermInput;
use chip8vm::sound::{Mute, SimpleBeep, Sound};
use clap::{Parser, ValueEnum};
use log::info;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Keys {
    /// COSMAC VIP layout on the left of the keyboard
    Conventional,
    /// 1234/qwer/asdf/zxcv as 0-f
    Sequential,
}

#[derive(Parser, Debug)]
#[command(name = "chip8vm", about = "Run CHIP-8 programs in the terminal", version)]
struct Cli {
    /// CHIP-8 program image to run
    rom: PathBuf,

    /// instructions per second
    #[arg(short = 'f', long, default_value_t = DEFAULT_CPU_HZ)]
    hz: u32,

    /// stop after this many instructions
    #[arg(short = 'n', long)]
    cycles: Option<u64>,

    /// seed the random number generator
    #[arg(short = 's', long)]
    seed: Option<u64>,

    /// treat unknown opcodes as fatal instead of skipping them
    #[arg(long)]
    strict: bool,

    /// keyboard layout
    #[arg(short = 'k', long, value_enum, default_value_t = Keys::Conventional)]
    keys: Keys,

    /// no beeping
    #[arg(short = 'm', long)]
    mute: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            cpu_hz: self.hz,
            opcode_policy: if self.strict {
                OpcodePolicy::Fatal
            } else {
                OpcodePolicy::Skip
            },
            seed: self.seed,
            keymap: match self.keys {
                Keys::Conventional => KeymapKind::Conventional,
                Keys::Sequential => KeymapKind::Sequential,
            },
            ..Config::default()
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = cli.config();

    // initialise
    let mut display = MonoTermDisplay::new()?;
    let mut input = TermInput::new(config.keymap)?;
    let mut sound: Box<dyn Sound> = if cli.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };
    let mut env = Environment::new(config, &mut display, &mut input, sound.as_mut());

    // load a program
    let mut f = File::open(&cli.rom)?;
    env.load_program(&mut f)?;
    let exit = env.main_loop(cli.cycles);
    let cycles = env.cycles();
    drop(env);
    if sound.is_beeping() {
        sound.stop()?;
    }

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..12 {
        println!();
    }
    match exit? {
        Exit::Quit => info!("quit after {} cycles", cycles),
        Exit::CycleLimit => info!("stopped after {} cycles", cycles),
    }
    Ok(())
}
