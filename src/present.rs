//! Renders a `StatsTable` as plain text or JSON.
//!
//! Files appear in walk order; index counts always ascend by index, in both formats.

use {
	crate::{
		stats::{IndexCounts, StatsKey, StatsMode, StatsTable},
		Error, Result,
	},
	core::{fmt, str::FromStr},
	serde::{
		ser::{SerializeMap, SerializeSeq},
		Serialize, Serializer,
	},
	std::{
		fs::File,
		io::{self, BufWriter, Write},
		path::Path,
	},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
	PlainText,
	Json,
}

impl OutputFormat {
	pub const NAMES: [&'static str; 2] = ["plain-text", "json"];
}

impl FromStr for OutputFormat {
	type Err = Error;
	fn from_str(s: &str) -> Result<Self> {
		match s {
			"plain-text" => Ok(Self::PlainText),
			"json" => Ok(Self::Json),
			_ => Err(Error::UnsupportedOutputFormat(s.to_owned())),
		}
	}
}

impl fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(Self::NAMES[*self as usize])
	}
}

/// JSON shape of a table: the bare summary counts, path -> counts, or a list of paths.
struct JsonView<'a>(&'a StatsTable);

impl Serialize for JsonView<'_> {
	fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
		let table = self.0;
		match table.mode() {
			StatsMode::Summary => table.summary().unwrap_or(&IndexCounts::new()).serialize(serializer),
			StatsMode::PerFile => {
				let mut map = serializer.serialize_map(Some(table.len()))?;
				for (key, counts) in table.entries() {
					map.serialize_entry(&key.to_string(), counts)?;
				}
				map.end()
			}
			StatsMode::FileNameOnly => {
				let mut seq = serializer.serialize_seq(Some(table.len()))?;
				for (key, _) in table.entries() {
					seq.serialize_element(&key.to_string())?;
				}
				seq.end()
			}
		}
	}
}

pub fn writePlainText(table: &StatsTable, out: &mut impl Write) -> io::Result<()> {
	for (key, counts) in table.entries() {
		let indent = if *key == StatsKey::Summary {
			""
		} else {
			writeln!(out, "{key}")?;
			"  "
		};
		for (index, count) in counts {
			writeln!(out, "{indent}{index}: {count}")?;
		}
	}
	Ok(())
}

/// Pretty-printed with two-space indentation, newline terminated.
pub fn writeJson(table: &StatsTable, out: &mut impl Write) -> io::Result<()> {
	serde_json::to_writer_pretty(&mut *out, &JsonView(table))?;
	writeln!(out)
}

pub fn write(table: &StatsTable, format: OutputFormat, out: &mut impl Write) -> io::Result<()> {
	match format {
		OutputFormat::PlainText => writePlainText(table, out),
		OutputFormat::Json => writeJson(table, out),
	}
}

/// Writes to `outputFile` (created or truncated) or, without one, to stdout.
pub fn output(table: &StatsTable, format: OutputFormat, outputFile: Option<&Path>) -> Result<()> {
	match outputFile {
		Some(path) => {
			let mut file = BufWriter::new(File::create(path).map_err(Error::io(path))?);
			write(table, format, &mut file).and_then(|()| file.flush()).map_err(Error::io(path))
		}
		None => {
			let mut stdout = io::stdout().lock();
			write(table, format, &mut stdout).and_then(|()| stdout.flush()).map_err(Error::io("<stdout>"))
		}
	}
}

#[cfg(test)]
mod tests {
	use {
		super::*,
		crate::{stats::ThresholdFilter, IndexGrid},
		std::{fs, path::PathBuf},
	};

	fn table(mode: StatsMode) -> StatsTable {
		let mut table = StatsTable::new(mode);
		for (path, grid) in [
			("b/one.png", IndexGrid::fromRows(&[[0, 1], [1, 2]])),
			("a/two.png", IndexGrid::fromRows(&[[2, 2], [2, 10]])),
		] {
			table.aggregate(&PathBuf::from(path), &grid, &ThresholdFilter::default());
		}
		table
	}

	fn rendered(table: &StatsTable, format: OutputFormat) -> String {
		let mut out = Vec::new();
		write(table, format, &mut out).unwrap();
		String::from_utf8(out).unwrap()
	}

	#[test]
	fn summaryPlainTextHasNoHeader() {
		assert_eq!(rendered(&table(StatsMode::Summary), OutputFormat::PlainText), "0: 1\n1: 2\n2: 4\n10: 1\n");
	}

	#[test]
	fn perFilePlainTextIndentsUnderPath() {
		assert_eq!(
			rendered(&table(StatsMode::PerFile), OutputFormat::PlainText),
			"b/one.png\n  0: 1\n  1: 2\n  2: 1\na/two.png\n  2: 3\n  10: 1\n"
		);
	}

	#[test]
	fn fileNameOnlyPlainTextListsPaths() {
		assert_eq!(rendered(&table(StatsMode::FileNameOnly), OutputFormat::PlainText), "b/one.png\na/two.png\n");
	}

	#[test]
	fn summaryJsonIsFlatMapping() {
		assert_eq!(
			rendered(&table(StatsMode::Summary), OutputFormat::Json),
			"{\n  \"0\": 1,\n  \"1\": 2,\n  \"2\": 4,\n  \"10\": 1\n}\n"
		);
	}

	#[test]
	fn perFileJsonKeepsWalkOrder() {
		let json = rendered(&table(StatsMode::PerFile), OutputFormat::Json);
		assert!(json.find("b/one.png").unwrap() < json.find("a/two.png").unwrap());
		let value: serde_json::Value = serde_json::from_str(&json).unwrap();
		assert_eq!(value["b/one.png"]["1"], 2);
		assert_eq!(value["a/two.png"]["10"], 1);
	}

	#[test]
	fn fileNameOnlyJsonIsList() {
		assert_eq!(
			rendered(&table(StatsMode::FileNameOnly), OutputFormat::Json),
			"[\n  \"b/one.png\",\n  \"a/two.png\"\n]\n"
		);
	}

	#[test]
	fn emptyTablesRenderEmpty() {
		assert_eq!(rendered(&StatsTable::new(StatsMode::Summary), OutputFormat::Json), "{}\n");
		assert_eq!(rendered(&StatsTable::new(StatsMode::FileNameOnly), OutputFormat::Json), "[]\n");
		assert_eq!(rendered(&StatsTable::new(StatsMode::PerFile), OutputFormat::PlainText), "");
	}

	#[test]
	fn outputFileIsTruncated() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("stats.txt");
		fs::write(&path, "stale content that is longer than the table\n".repeat(10)).unwrap();
		output(&table(StatsMode::Summary), OutputFormat::PlainText, Some(&path)).unwrap();
		assert_eq!(fs::read_to_string(&path).unwrap(), "0: 1\n1: 2\n2: 4\n10: 1\n");
	}

	#[test]
	fn formatNamesRoundTripAndRejectOthers() {
		for name in OutputFormat::NAMES {
			assert_eq!(name.parse::<OutputFormat>().unwrap().to_string(), name);
		}
		assert!(matches!("yaml".parse::<OutputFormat>(), Err(Error::UnsupportedOutputFormat(_))));
	}
}
