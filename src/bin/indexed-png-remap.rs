#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	anyhow::Context,
	clap::Parser,
	indexed_png_stats::remap::{self, IndexMapping},
	log::LevelFilter,
	std::path::PathBuf,
};

/// Remaps color palette entries in indexed PNGs. E.g., swapping 5 with 1.
#[derive(Parser, Debug)]
#[clap(name = "indexed-png-remap", version)]
struct Args {
	/// the directory with the PNG files
	#[clap(short = 'd', long = "image_dir", value_name = "DIR", required = true, multiple_values = true)]
	imageDirs: Vec<PathBuf>,

	/// whether to scan the directory recursively
	#[clap(short, long)]
	recursive: bool,

	/// the mapping of 0-based palette indices to apply (format: old:new)
	#[clap(
		short,
		long,
		value_name = "OLD:NEW",
		multiple_values = true,
		required_unless_present = "mapping-file"
	)]
	mapping: Vec<String>,

	/// TOML file with a [mapping] table of old = new entries, overridden by --mapping
	#[clap(short = 'M', name = "mapping-file", long = "mapping_file", value_name = "FILE")]
	mappingFile: Option<PathBuf>,

	/// whether to create a backup of the original images
	#[clap(short, long)]
	backup: bool,

	/// whether to be more verbose with the processing
	#[clap(short, long)]
	verbose: bool,
}

fn main() -> anyhow::Result<()> {
	let Args { imageDirs, recursive, mapping, mappingFile, backup, verbose } = Args::parse();
	env_logger::Builder::new()
		.filter_level(if verbose { LevelFilter::Info } else { LevelFilter::Warn })
		.parse_default_env()
		.format_target(false)
		.init();

	let mapping = {
		let mut fromFile = match &mappingFile {
			Some(path) => IndexMapping::fromTomlFile(path)?,
			None => IndexMapping::new(),
		};
		fromFile.extend(IndexMapping::fromTokens(&mapping)?);
		fromFile
	};
	remap::remapAll(&imageDirs, recursive, &mapping, backup).context("remapping palette indices")?;
	Ok(())
}
