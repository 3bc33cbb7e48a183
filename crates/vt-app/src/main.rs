use anyhow::Result;
use clap::Parser;
use vt_audio::BurgFrontEnd;
use vt_core::config::BatchConfig;
use vt_grid::TextGridReader;

pub mod batch;
pub mod cli;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config, puis appliquer les overrides CLI
    let mut config = resolve_config(&cli)?;
    cli.apply(&mut config);

    // 4. Traitement par lots
    log::info!(
        "Batch: audio {} / alignments {} -> {}",
        config.audio_dir.display(),
        config.alignment_dir.display(),
        config.output_path().display()
    );
    let summary = batch::run_batch(&config, &BurgFrontEnd, &TextGridReader)?;

    // 5. Résumé optionnel
    if let Some(ref path) = cli.summary {
        summary.write_json(path)?;
    }
    Ok(())
}

/// Load the config file, or fall back to defaults when it does not exist.
fn resolve_config(cli: &cli::Cli) -> Result<BatchConfig> {
    if cli.config.exists() {
        vt_core::config::load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(BatchConfig::default())
    }
}
