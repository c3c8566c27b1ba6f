#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

//! Palette-index statistics and palette-index remapping for indexed PNG files.

pub mod backup;
pub mod classify;
pub mod error;
pub mod present;
pub mod remap;
pub mod stats;
pub mod walk;

pub use error::{Error, Result};

/// Number of addressable palette entries of an indexed PNG.
pub const PAL_LEN: usize = u8::MAX as usize + 1;

/// Index every unmapped pixel falls back to during a remap.
pub const BACKGROUND_INDEX: u8 = 0;

/// Row-major grid of palette indices, one per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexGrid {
	pub width: usize,
	pub height: usize,
	pub data: Vec<u8>,
}

impl IndexGrid {
	pub fn fromWidthHeight(width: usize, height: usize) -> Self {
		Self { width, height, data: vec![BACKGROUND_INDEX; width * height] }
	}

	pub fn fromRows<const W: usize>(rows: &[[u8; W]]) -> Self {
		let data = rows.iter().flatten().copied().collect::<Vec<_>>();
		Self { width: W, height: rows.len(), data }
	}

	#[inline]
	pub fn pixelCount(&self) -> usize {
		self.data.len()
	}

	pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
		// `chunks` rejects a zero size
		self.data.chunks(self.width.max(1)).take(self.height)
	}
}

/// Colour table of an indexed image. Never interpreted, only carried back to the encoder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
	/// `PLTE` chunk: RGB triples.
	pub rgb: Vec<u8>,
	/// `tRNS` chunk: one alpha per leading palette entry.
	pub trns: Option<Vec<u8>>,
}
