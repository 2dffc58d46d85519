use anyhow::Context;
use btt_preset::{patch_file, PatchProfile};
use clap::{value_parser, Arg, Command};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn cli() -> Command {
    Command::new("btt-preset-patch")
        .version(btt_preset::VERSION)
        .about("Patch a BetterTouchTool preset: drop Touch Bar context triggers, clone app configs")
        .arg(
            Arg::new("preset")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Source preset archive (.bttpreset)"),
        )
        .arg(
            Arg::new("profile")
                .long("profile")
                .value_parser(value_parser!(PathBuf))
                .help("TOML patch profile overriding the built-in defaults"),
        )
}

fn run(preset: &Path, profile: Option<&Path>) -> anyhow::Result<()> {
    let profile = match profile {
        Some(path) => PatchProfile::from_toml_file(path)
            .with_context(|| format!("loading profile {}", path.display()))?,
        None => PatchProfile::default(),
    };

    let outcome = patch_file(preset, profile).with_context(|| format!("patching {}", preset.display()))?;
    println!("Patched preset written to {}", outcome.output.display());
    println!(
        "  apps deleted: {}, triggers deleted: {}, clones added: {}, conditions grafted: {}",
        outcome.summary.deleted_apps,
        outcome.summary.deleted_triggers,
        outcome.summary.clones_added,
        outcome.summary.conditions_grafted
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = match cli().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::from(2) } else { ExitCode::SUCCESS };
        }
    };

    let Some(preset) = matches.get_one::<PathBuf>("preset") else {
        return ExitCode::from(2);
    };
    match run(preset, matches.get_one::<PathBuf>("profile").map(PathBuf::as_path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
