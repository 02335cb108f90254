use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "cpgea")]
#[command(about = "Trait enrichment analysis for CpG probe panels")]
#[command(version)]
pub struct Cli {
    #[clap(help = "Background annotation table (tab-separated)")]
    #[clap(value_name = "BACKGROUND")]
    #[arg(value_parser = check_file_exists)]
    pub background_path: PathBuf,

    #[clap(help = "Sample file with probe IDs (one per line, no header)")]
    #[clap(value_name = "SAMPLE")]
    #[arg(value_parser = check_file_exists)]
    pub sample_path: PathBuf,

    #[clap(help = "Path for the significant enrichment results (CSV)")]
    #[clap(value_name = "OUTPUT")]
    pub output_path: PathBuf,

    #[clap(long = "p-value-threshold")]
    #[clap(value_name = "THRESHOLD")]
    #[clap(help = "P-value threshold for significance")]
    #[clap(default_value = "0.05")]
    #[arg(value_parser = threshold_in_range)]
    pub pvalue_threshold: f64,

    #[clap(long = "cols-contain")]
    #[clap(value_name = "SUBSTRING")]
    #[clap(help = "Substring identifying trait columns (case-insensitive)")]
    #[clap(default_value = "human")]
    pub columns_contain: String,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "first-column-only")]
    #[clap(help = "Test only the first matching trait column")]
    pub first_column_only: bool,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .filter_level(filter_level)
        .init();
}

fn check_file_exists(s: &str) -> Result<PathBuf, String> {
    let path = Path::new(s);
    if !path.exists() {
        return Err(format!("File does not exist: {}", path.display()));
    }
    Ok(path.to_path_buf())
}

fn threshold_in_range(s: &str) -> Result<f64, String> {
    let threshold: f64 = s
        .parse()
        .map_err(|_| format!("`{s}` is not a number"))?;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(format!("threshold not in range 0.0-1.0: {threshold}"));
    }
    Ok(threshold)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn threshold_bounds() {
        assert!(threshold_in_range("0.05").is_ok());
        assert!(threshold_in_range("1.0").is_ok());
        assert!(threshold_in_range("1.5").is_err());
        assert!(threshold_in_range("-0.1").is_err());
        assert!(threshold_in_range("abc").is_err());
    }
}
