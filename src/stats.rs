//! Per-palette-index pixel counts, folded over many files.

use {
	crate::{classify, Error, IndexGrid, Result, PAL_LEN},
	core::{fmt, str::FromStr},
	log::info,
	std::{
		collections::{BTreeMap, BTreeSet, HashMap},
		path::{Path, PathBuf},
	},
};

/// Pixel count per palette index, ascending by index. Indices that don't occur are absent.
pub type IndexCounts = BTreeMap<u8, u64>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsMode {
	Summary,
	PerFile,
	FileNameOnly,
}

impl StatsMode {
	pub const NAMES: [&'static str; 3] = ["summary", "per-file", "file-name-only"];

	pub fn name(self) -> &'static str {
		Self::NAMES[self as usize]
	}
}

impl FromStr for StatsMode {
	type Err = Error;
	fn from_str(s: &str) -> Result<Self> {
		match s {
			"summary" => Ok(Self::Summary),
			"per-file" => Ok(Self::PerFile),
			"file-name-only" => Ok(Self::FileNameOnly),
			_ => Err(Error::UnsupportedStatsMode(s.to_owned())),
		}
	}
}

impl fmt::Display for StatsMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Keeps a file only if some index count breaks a bound. Without any bound every file is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThresholdFilter {
	pub below: Option<u64>,
	pub above: Option<u64>,
	/// Restricts the bounds to these indices; `None` means every index present.
	pub indices: Option<BTreeSet<u8>>,
}

impl ThresholdFilter {
	pub fn isActive(&self) -> bool {
		self.below.is_some() || self.above.is_some()
	}

	pub fn includes(&self, counts: &IndexCounts) -> bool {
		if !self.isActive() {
			return true;
		}
		counts.iter().any(|(index, &count)| {
			self.indices.as_ref().map_or(true, |indices| indices.contains(index))
				&& (self.below.map_or(false, |below| count < below) || self.above.map_or(false, |above| count > above))
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StatsKey {
	Summary,
	File(PathBuf),
}

impl StatsKey {
	pub const SUMMARY_LABEL: &'static str = "all";
}

impl fmt::Display for StatsKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Summary => f.write_str(Self::SUMMARY_LABEL),
			Self::File(path) => write!(f, "{}", path.display()),
		}
	}
}

/// Aggregated counts of one collection run, in the order entries were first created.
#[derive(Clone, Debug)]
pub struct StatsTable {
	mode: StatsMode,
	entries: Vec<(StatsKey, IndexCounts)>,
	positions: HashMap<StatsKey, usize>,
}

impl StatsTable {
	pub fn new(mode: StatsMode) -> Self {
		Self { mode, entries: Vec::new(), positions: HashMap::new() }
	}

	#[inline]
	pub fn mode(&self) -> StatsMode {
		self.mode
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn entries(&self) -> impl Iterator<Item = (&StatsKey, &IndexCounts)> + '_ {
		self.entries.iter().map(|(key, counts)| (key, counts))
	}

	pub fn get(&self, key: &StatsKey) -> Option<&IndexCounts> {
		self.positions.get(key).map(|&i| &self.entries[i].1)
	}

	pub fn summary(&self) -> Option<&IndexCounts> {
		self.get(&StatsKey::Summary)
	}

	fn entry(&mut self, key: StatsKey) -> &mut IndexCounts {
		let i = match self.positions.get(&key) {
			Some(&i) => i,
			None => {
				self.positions.insert(key.clone(), self.entries.len());
				self.entries.push((key, IndexCounts::new()));
				self.entries.len() - 1
			}
		};
		&mut self.entries[i].1
	}

	pub fn aggregate(&mut self, path: &Path, grid: &IndexGrid, filter: &ThresholdFilter) -> bool {
		let counts = countIndices(grid);
		if !filter.includes(&counts) {
			return false;
		}
		match self.mode {
			StatsMode::Summary => {
				if counts.is_empty() {
					return true;
				}
				let summary = self.entry(StatsKey::Summary);
				for (index, count) in counts {
					*summary.entry(index).or_insert(0) += count;
				}
			}
			StatsMode::PerFile => *self.entry(StatsKey::File(path.to_owned())) = counts,
			StatsMode::FileNameOnly => self.entry(StatsKey::File(path.to_owned())).clear(),
		}
		true
	}
}

pub fn countIndices(grid: &IndexGrid) -> IndexCounts {
	let mut counts = [0_u64; PAL_LEN];
	for &index in &grid.data {
		counts[index as usize] += 1;
	}
	counts
		.iter()
		.enumerate()
		.filter(|&(_, &count)| count != 0)
		.map(|(index, &count)| (index as u8, count))
		.collect()
}

/// Walks `roots`, counting the indices of every indexed PNG into a fresh table.
pub fn collect<P: AsRef<Path>>(
	roots: &[P],
	recursive: bool,
	mode: StatsMode,
	filter: &ThresholdFilter,
) -> Result<StatsTable> {
	let (mut table, mut seen, mut included) = (StatsTable::new(mode), 0_usize, 0_usize);
	for image in classify::palettedImages(roots, recursive) {
		let (path, image) = image?;
		seen += 1;
		if table.aggregate(&path, &image.grid, filter) {
			included += 1;
		} else {
			info!("  excluded by threshold");
		}
	}
	info!("{included} of {seen} indexed PNGs included ({mode})");
	Ok(table)
}
