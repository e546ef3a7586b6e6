use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use mustang_lib::{AmpSettings, EffectSettings, EffectType, Session, UsbTransport};

/// Control a Fender Mustang amplifier over USB.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Optional path to a file to write logs to, in addition to the console.
    #[arg(short, long, global = true)]
    log_file: Option<PathBuf>,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the preset names stored on the amp.
    Presets,
    /// Load a stored bank and print it.
    Load {
        slot: u8,
        /// Print the bank as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Place an effect into a slot of the live signal chain.
    SetEffect {
        /// Logical effect slot, 0-3.
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=3))]
        slot: u8,
        /// Effect name, e.g. `sine_chorus` or `empty`.
        #[arg(short, long)]
        effect: EffectType,
        /// Up to six comma separated knob values.
        #[arg(short, long, value_delimiter = ',', num_args = 0..=6)]
        knobs: Vec<u8>,
        #[arg(long)]
        post_amp: bool,
    },
    /// Send amplifier settings read from a JSON file.
    SetAmp { file: PathBuf },
    /// Store the current settings under a new name.
    Rename { slot: u8, name: String },
    /// Persist up to two effects, read from a JSON file, with a bank.
    SaveEffects { slot: u8, name: String, file: PathBuf },
}

/// Console logging on stderr, plus a plain-text copy in `log_file` when one
/// is given. The returned guard flushes the file on drop.
fn init_tracing(log_file: Option<&Path>, verbosity: &Verbosity<InfoLevel>) -> Result<Option<WorkerGuard>> {
    let (file_writer, guard) = match log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create log file at {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    // -v raises INFO to DEBUG, which shows every packet as hex
    let env_filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).without_time())
        .with(file_writer.map(|writer| fmt::layer().with_writer(writer).with_ansi(false)))
        .init();

    Ok(guard)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    serde_json::from_reader(file).with_context(|| format!("Failed to parse {:?}", path))
}

fn knob_array(knobs: &[u8]) -> Result<[u8; 6]> {
    if knobs.len() > 6 {
        bail!("at most six knob values are accepted, got {}", knobs.len());
    }
    let mut array = [0; 6];
    array[..knobs.len()].copy_from_slice(knobs);
    Ok(array)
}

fn run(command: Command) -> Result<()> {
    let transport = UsbTransport::new().context("Failed to create USB transport")?;
    let mut session = Session::new(transport);
    let initial = session.start().context("Failed to start session with the amplifier")?;
    info!(bank = %initial.chain.name, presets = initial.presets.len(), "Connected");

    match command {
        Command::Presets => {
            for (index, name) in initial.presets.iter().enumerate() {
                println!("{index:3}  {name}");
            }
        }
        Command::Load { slot, json } => {
            let chain = session.load_bank(slot).with_context(|| format!("Failed to load bank {slot}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&chain)?);
            } else {
                println!("Bank {slot}: {}", chain.name);
                println!(
                    "  Amp: {} (gain {}, volume {}, cabinet {})",
                    chain.amp.model, chain.amp.gain, chain.amp.volume, chain.amp.cabinet
                );
                for effect in &chain.effects {
                    let position = if effect.post_amp { "post" } else { "pre" };
                    println!("  Slot {} [{position}]: {} {:?}", effect.slot, effect.effect, effect.knobs);
                }
            }
        }
        Command::SetEffect {
            slot,
            effect,
            knobs,
            post_amp,
        } => {
            let settings = EffectSettings {
                slot,
                effect,
                knobs: knob_array(&knobs)?,
                post_amp,
            };
            session.set_effect(&settings).context("Failed to set effect")?;
        }
        Command::SetAmp { file } => {
            let amp: AmpSettings = read_json(&file)?;
            session.set_amplifier(&amp).context("Failed to set amplifier")?;
        }
        Command::Rename { slot, name } => {
            session
                .save_on_amp(&name, slot)
                .with_context(|| format!("Failed to save bank {slot}"))?;
        }
        Command::SaveEffects { slot, name, file } => {
            let effects: Vec<EffectSettings> = read_json(&file)?;
            session
                .save_effects(slot, &name, &effects)
                .with_context(|| format!("Failed to save effects to bank {slot}"))?;
        }
    }

    session.stop();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref(), &cli.verbose)?;
    if let Some(path) = &cli.log_file {
        info!(path = %path.display(), "Logging to file");
    }

    if let Err(e) = run(cli.command) {
        error!("{:?}", e);
        process::exit(1);
    }

    Ok(())
}
