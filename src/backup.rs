use {
	crate::{Error, Result},
	log::info,
	std::{
		ffi::OsString,
		fs::{File, OpenOptions},
		io::{self, ErrorKind},
		path::{Path, PathBuf},
	},
};

/// `path` + `.bak` for attempt 0, `path` + `.bak<attempt>` after that.
pub fn backupPath(path: &Path, attempt: usize) -> PathBuf {
	let mut name = OsString::from(path.as_os_str());
	name.push(".bak");
	if attempt != 0 {
		name.push(attempt.to_string());
	}
	name.into()
}

/// Copies `path` byte for byte to the first backup name that doesn't exist yet.
pub fn createBackup(path: &Path) -> Result<PathBuf> {
	let mut original = File::open(path).map_err(Error::io(path))?;
	for attempt in 0.. {
		let backup = backupPath(path, attempt);
		let mut copy = match OpenOptions::new().write(true).create_new(true).open(&backup) {
			Ok(file) => file,
			Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
			Err(err) => return Err(Error::io(backup)(err)),
		};
		if let Some(name) = backup.file_name() {
			info!("  creating backup: {}", name.to_string_lossy());
		}
		io::copy(&mut original, &mut copy).map_err(Error::io(&backup))?;
		return Ok(backup);
	}
	unreachable!("backup suffixes exhausted for {path:?}")
}
