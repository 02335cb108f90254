use clap::Parser;

use cpgea::parser::{background, sample};
use cpgea::report;
use cpgea::stats::fisher::{trait_enrichment, EnrichmentOptions};
use cpgea::{CpgeaError, CpgeaResult};

mod cli;
use cli::{init_verbose, Cli};

fn runner() -> CpgeaResult<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    log::info!(
        "Running {}-{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let table = background::parse(&cli.background_path)?;
    log::info!(
        "Background: {} probes, {} annotation columns",
        table.len(),
        table.columns().len()
    );

    let sample_ids = sample::parse(&cli.sample_path)?;
    log::info!("Sample: {} probe IDs", sample_ids.len());

    let options = EnrichmentOptions {
        pvalue_threshold: cli.pvalue_threshold,
        columns_contain: cli.columns_contain.clone(),
        first_column_only: cli.first_column_only,
    };
    let results = trait_enrichment(&table, &sample_ids, &options)?;

    if results.is_empty() {
        log::info!(
            "No significant enrichment found (p < {})",
            cli.pvalue_threshold
        );
    } else {
        log::info!("{} significant traits", results.len());
    }

    report::write_results(&cli.output_path, &results)?;
    log::info!("Results saved to: {}", cli.output_path.display());
    Ok(())
}

fn handle_error_and_exit(err: CpgeaError) -> ! {
    log::error!("{}", err);
    std::process::exit(1);
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
