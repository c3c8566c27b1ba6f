#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	anyhow::Context,
	clap::Parser,
	indexed_png_stats::{
		present::{self, OutputFormat},
		stats::{self, StatsMode, ThresholdFilter},
	},
	log::LevelFilter,
	std::path::PathBuf,
};

/// Generates statistics from indexed PNG files.
#[derive(Parser, Debug)]
#[clap(name = "indexed-png-stats", version)]
struct Args {
	/// the directory with the PNG files
	#[clap(short = 'd', long = "image_dir", value_name = "DIR", required = true, multiple_values = true)]
	imageDirs: Vec<PathBuf>,

	/// whether to scan the directory recursively
	#[clap(short, long)]
	recursive: bool,

	/// the type of statistics to generate: summary, per-file or file-name-only
	#[clap(short = 't', long = "stats_type", default_value = "summary")]
	statsType: String,

	/// how to present the statistics: plain-text or json
	#[clap(short = 'f', long = "output_format", default_value = "plain-text")]
	outputFormat: String,

	/// the file to store the generated statistics in, stdout if omitted
	#[clap(short, long = "output_file", value_name = "FILE")]
	outputFile: Option<PathBuf>,

	/// only include files where some index has fewer pixels than this
	#[clap(short, long, value_name = "COUNT")]
	below: Option<u64>,

	/// only include files where some index has more pixels than this
	#[clap(short, long, value_name = "COUNT")]
	above: Option<u64>,

	/// the palette indices the thresholds apply to, all indices if omitted
	#[clap(short, long, value_name = "INDEX", multiple_values = true)]
	indices: Option<Vec<u8>>,

	/// whether to be more verbose with the processing
	#[clap(short, long)]
	verbose: bool,
}

fn main() -> anyhow::Result<()> {
	let Args { imageDirs, recursive, statsType, outputFormat, outputFile, below, above, indices, verbose } =
		Args::parse();
	env_logger::Builder::new()
		.filter_level(if verbose { LevelFilter::Info } else { LevelFilter::Warn })
		.parse_default_env()
		.format_target(false)
		.init();

	let (mode, format) = (statsType.parse::<StatsMode>()?, outputFormat.parse::<OutputFormat>()?);
	let filter = ThresholdFilter { below, above, indices: indices.map(|indices| indices.into_iter().collect()) };
	let table = stats::collect(&imageDirs, recursive, mode, &filter).context("collecting statistics")?;
	present::output(&table, format, outputFile.as_deref()).context("writing statistics")
}
