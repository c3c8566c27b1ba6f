//! Decides whether a file is an indexed PNG, and moves index grids in and out of PNG files.

use {
	crate::{walk, Error, IndexGrid, Palette, Result},
	log::{debug, info},
	png::{BitDepth, ColorType, Transformations},
	std::{
		fs::{self, File},
		io::{self, BufReader, Read},
		path::{Path, PathBuf},
	},
	thiserror::Error,
};

#[derive(Debug)]
pub struct PalettedImage {
	pub grid: IndexGrid,
	pub palette: Palette,
	/// Bit depth the file was stored with.
	pub bitDepth: BitDepth,
}

#[derive(Debug)]
pub enum Classification {
	Paletted(PalettedImage),
	/// Name doesn't end in `.png`; the file was never opened.
	NotPng,
	/// A valid PNG without a palette.
	NotPaletted(ColorType),
	Unreadable(Unreadable),
}

#[derive(Debug, Error)]
pub enum Unreadable {
	#[error("cannot read: {0}")]
	Io(#[source] io::Error),

	#[error("not a decodable PNG: {0}")]
	Decode(#[source] png::DecodingError),
}

impl From<png::DecodingError> for Unreadable {
	fn from(err: png::DecodingError) -> Self {
		match err {
			png::DecodingError::IoError(err) => Self::Io(err),
			err => Self::Decode(err),
		}
	}
}

pub fn classify(path: &Path) -> Classification {
	if !walk::isPngName(path) {
		return Classification::NotPng;
	}
	let file = match File::open(path) {
		Ok(file) => file,
		Err(err) => return Classification::Unreadable(Unreadable::Io(err)),
	};
	match PalettedImage::fromPNG(BufReader::new(file)) {
		Ok(Ok(image)) => Classification::Paletted(image),
		Ok(Err(colorType)) => Classification::NotPaletted(colorType),
		Err(err) => Classification::Unreadable(err),
	}
}

/// Walks `roots` and yields the decoded indexed PNGs among the files found, skipping the rest.
///
/// Walk errors are passed through; whatever `classify` rejects is only traced.
pub fn palettedImages<'a, P>(
	roots: &'a [P],
	recursive: bool,
) -> impl Iterator<Item = Result<(PathBuf, PalettedImage)>> + 'a
where
	P: AsRef<Path>,
{
	walk::walk(roots, recursive).filter_map(|path| {
		let path = match path {
			Ok(path) => path,
			Err(err) => return Some(Err(err)),
		};
		if !walk::isPngName(&path) {
			return None;
		}
		info!("{}", path.display());
		match classify(&path) {
			Classification::Paletted(image) => Some(Ok((path, image))),
			Classification::NotPng => None,
			Classification::NotPaletted(colorType) => {
				info!("  no palette information");
				debug!("  color type {colorType:?}");
				None
			}
			Classification::Unreadable(err) => {
				info!("  no palette information");
				debug!("  {err}");
				None
			}
		}
	})
}

impl PalettedImage {
	/// Decodes a PNG stream. `Ok(Err(_))` carries the colour type of a PNG that has no palette.
	pub fn fromPNG(
		reader: impl Read,
	) -> core::result::Result<core::result::Result<Self, ColorType>, Unreadable> {
		let mut decoder = png::Decoder::new(reader);
		decoder.set_transformations(Transformations::IDENTITY);
		let mut png = decoder.read_info()?;
		let (colorType, palette) = {
			let info = png.info();
			(
				info.color_type,
				info.palette.as_ref().map(|rgb| Palette {
					rgb: rgb.clone().into_owned(),
					trns: info.trns.as_ref().map(|trns| trns.clone().into_owned()),
				}),
			)
		};
		let palette = match (colorType, palette) {
			(ColorType::Indexed, Some(palette)) => palette,
			(colorType, _) => return Ok(Err(colorType)),
		};
		let mut buffer = vec![0; png.output_buffer_size()];
		let frame = png.next_frame(&mut buffer)?;
		let (width, height) = (frame.width as usize, frame.height as usize);
		let grid = IndexGrid {
			width,
			height,
			data: unpackRows(&buffer, frame.line_size, width, height, frame.bit_depth as usize),
		};
		Ok(Ok(Self { grid, palette, bitDepth: frame.bit_depth }))
	}
}

fn unpackRows(packed: &[u8], lineSize: usize, width: usize, height: usize, bitsPerPixel: usize) -> Vec<u8> {
	if bitsPerPixel == 8 {
		return packed.chunks(lineSize).take(height).flat_map(|row| &row[..width]).copied().collect();
	}
	let (mask, mut data) = ((1_u16 << bitsPerPixel) - 1, Vec::with_capacity(width * height));
	for row in packed.chunks(lineSize).take(height) {
		for x in 0..width {
			let bitOffset = x * bitsPerPixel;
			let shift = 8 - bitsPerPixel - bitOffset % 8;
			data.push(((u16::from(row[bitOffset / 8]) >> shift) & mask) as u8);
		}
	}
	data
}

fn packRows(grid: &IndexGrid, bitsPerPixel: usize) -> Vec<u8> {
	if bitsPerPixel == 8 {
		return grid.data.clone();
	}
	let lineSize = (grid.width * bitsPerPixel + 7) / 8;
	let mut packed = vec![0; lineSize * grid.height];
	for (row, line) in grid.rows().zip(packed.chunks_mut(lineSize)) {
		for (x, &index) in row.iter().enumerate() {
			let bitOffset = x * bitsPerPixel;
			line[bitOffset / 8] |= index << (8 - bitsPerPixel - bitOffset % 8);
		}
	}
	packed
}

/// `preferred` while every index of `grid` fits in it, eight bits otherwise.
fn fittingDepth(grid: &IndexGrid, preferred: BitDepth) -> BitDepth {
	let maxIndex = grid.data.iter().copied().max().unwrap_or(0);
	if usize::from(maxIndex) < 1 << (preferred as usize) {
		preferred
	} else {
		BitDepth::Eight
	}
}

/// Encodes `grid` as an indexed PNG carrying `palette` verbatim.
pub fn encode(
	grid: &IndexGrid,
	palette: &Palette,
	bitDepth: BitDepth,
) -> core::result::Result<Vec<u8>, png::EncodingError> {
	let bitDepth = fittingDepth(grid, bitDepth);
	let mut bytes = Vec::new();
	{
		let mut png = png::Encoder::new(&mut bytes, grid.width as _, grid.height as _);
		png.set_color(ColorType::Indexed);
		png.set_depth(bitDepth);
		png.set_palette(palette.rgb.as_slice());
		if let Some(trns) = &palette.trns {
			png.set_trns(trns.as_slice());
		}
		let mut writer = png.write_header()?;
		writer.write_image_data(&packRows(grid, bitDepth as usize))?;
		writer.finish()?;
	}
	Ok(bytes)
}

/// Replaces the file at `path` with `grid`; the file is untouched when encoding fails.
pub fn writeIndexed(path: &Path, grid: &IndexGrid, palette: &Palette, bitDepth: BitDepth) -> Result<()> {
	let bytes =
		encode(grid, palette, bitDepth).map_err(|source| Error::Encode { path: path.to_owned(), source })?;
	fs::write(path, bytes).map_err(Error::io(path))
}
