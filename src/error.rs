use {std::path::PathBuf, thiserror::Error};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	#[error("unsupported stats type: {0}")]
	UnsupportedStatsMode(String),

	#[error("unsupported output format: {0}")]
	UnsupportedOutputFormat(String),

	#[error("invalid mapping, expected 'old:new' but found: {0}")]
	InvalidMapping(String),

	#[error("{path:?}: invalid mapping file: {source}")]
	InvalidMappingFile { path: PathBuf, source: toml::de::Error },

	#[error("{0:?}: not a directory")]
	NotADirectory(PathBuf),

	#[error(transparent)]
	Walk(#[from] walkdir::Error),

	#[error("{path:?}: {source}")]
	Io { path: PathBuf, source: std::io::Error },

	#[error("{path:?}: {source}")]
	Encode { path: PathBuf, source: png::EncodingError },
}

impl Error {
	pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
		let path = path.into();
		move |source| Self::Io { path, source }
	}
}
