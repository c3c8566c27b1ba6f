//! Rewrites palette indices of indexed PNGs through an old -> new mapping.
//!
//! The rewrite is a projection: every pixel whose index is a key of the mapping takes the mapped
//! value, every other pixel drops to `BACKGROUND_INDEX`. Indices that should survive need an
//! explicit identity pair.

use {
	crate::{backup, classify, Error, IndexGrid, Result, BACKGROUND_INDEX, PAL_LEN},
	core::{fmt, str::FromStr},
	log::{info, warn},
	serde::Deserialize,
	std::{collections::BTreeMap, fs, path::Path},
};

/// Old index -> new index. Keys are unique by construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexMapping(BTreeMap<u8, u8>);

impl IndexMapping {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, old: u8, new: u8) -> Option<u8> {
		self.0.insert(old, new)
	}

	pub fn get(&self, old: u8) -> Option<u8> {
		self.0.get(&old).copied()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn pairs(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
		self.0.iter().map(|(&old, &new)| (old, new))
	}

	pub fn identityOf(grid: &IndexGrid) -> Self {
		grid.data.iter().map(|&index| (index, index)).collect()
	}

	/// Parses `old:new` tokens; later tokens win over earlier ones with the same `old`.
	pub fn fromTokens<S: AsRef<str>>(tokens: impl IntoIterator<Item = S>) -> Result<Self> {
		let mut mapping = Self::new();
		for token in tokens {
			let (old, new) = parsePair(token.as_ref())?;
			mapping.insert(old, new);
		}
		Ok(mapping)
	}

	pub fn fromTomlFile(path: &Path) -> Result<Self> {
		#[derive(Deserialize)]
		struct MappingFile {
			mapping: BTreeMap<String, u8>,
		}
		let text = fs::read_to_string(path).map_err(Error::io(path))?;
		let MappingFile { mapping } = toml::from_str(&text)
			.map_err(|source| Error::InvalidMappingFile { path: path.to_owned(), source })?;
		mapping
			.into_iter()
			.map(|(old, new)| {
				old.trim().parse().map(|old| (old, new)).map_err(|_| Error::InvalidMapping(format!("{old}:{new}")))
			})
			.collect()
	}

	pub fn extend(&mut self, other: Self) {
		self.0.extend(other.0);
	}

	fn lookupTable(&self) -> [Option<u8>; PAL_LEN] {
		let mut table = [None; PAL_LEN];
		for (old, new) in self.pairs() {
			table[old as usize] = Some(new);
		}
		table
	}
}

impl FromIterator<(u8, u8)> for IndexMapping {
	fn from_iter<I: IntoIterator<Item = (u8, u8)>>(pairs: I) -> Self {
		Self(pairs.into_iter().collect())
	}
}

impl FromStr for IndexMapping {
	type Err = Error;
	fn from_str(s: &str) -> Result<Self> {
		Self::fromTokens(s.split_whitespace())
	}
}

impl fmt::Display for IndexMapping {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("{")?;
		for (i, (old, new)) in self.pairs().enumerate() {
			write!(f, "{}{old}: {new}", if i == 0 { "" } else { ", " })?;
		}
		f.write_str("}")
	}
}

fn parsePair(token: &str) -> Result<(u8, u8)> {
	let invalid = || Error::InvalidMapping(token.to_owned());
	let mut parts = token.split(':');
	match (parts.next(), parts.next(), parts.next()) {
		(Some(old), Some(new), None) => {
			Ok((old.trim().parse().map_err(|_| invalid())?, new.trim().parse().map_err(|_| invalid())?))
		}
		_ => Err(invalid()),
	}
}

/// Projects `grid` through `mapping`. The flag is set when some pixel's index is a key of `mapping`,
/// identity pairs included.
pub fn remap(grid: &IndexGrid, mapping: &IndexMapping) -> (IndexGrid, bool) {
	let (table, mut modified) = (mapping.lookupTable(), false);
	let mut output =
		IndexGrid { width: grid.width, height: grid.height, data: vec![BACKGROUND_INDEX; grid.pixelCount()] };
	for (dest, &src) in output.data.iter_mut().zip(&grid.data) {
		if let Some(new) = table[src as usize] {
			*dest = new;
			modified = true;
		}
	}
	(output, modified)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemapReport {
	pub rewritten: usize,
	pub untouched: usize,
	pub backups: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileOutcome {
	Rewritten { backedUp: bool },
	Untouched,
}

/// Remaps one decoded indexed PNG and writes it back in place when anything matched.
pub fn remapFile(
	path: &Path,
	image: &classify::PalettedImage,
	mapping: &IndexMapping,
	backup: bool,
) -> Result<FileOutcome> {
	let (grid, modified) = remap(&image.grid, mapping);
	if !modified {
		info!("  nothing remapped");
		return Ok(FileOutcome::Untouched);
	}
	if backup {
		backup::createBackup(path)?;
	}
	info!("  got modified, saving");
	classify::writeIndexed(path, &grid, &image.palette, image.bitDepth)?;
	Ok(FileOutcome::Rewritten { backedUp: backup })
}

/// Walks `roots` and remaps every indexed PNG found. Stops at the first error; files rewritten
/// before it stay rewritten.
pub fn remapAll<P: AsRef<Path>>(
	roots: &[P],
	recursive: bool,
	mapping: &IndexMapping,
	backup: bool,
) -> Result<RemapReport> {
	info!("Mapping: {mapping}");
	if mapping.is_empty() {
		warn!("empty mapping, no file will be rewritten");
	}
	let mut report = RemapReport::default();
	for image in classify::palettedImages(roots, recursive) {
		let (path, image) = image?;
		match remapFile(&path, &image, mapping, backup)? {
			FileOutcome::Rewritten { backedUp } => {
				report.rewritten += 1;
				report.backups += usize::from(backedUp);
			}
			FileOutcome::Untouched => report.untouched += 1,
		}
	}
	info!("{} rewritten, {} untouched, {} backups", report.rewritten, report.untouched, report.backups);
	Ok(report)
}
