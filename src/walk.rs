//! Depth-first enumeration of candidate files below a set of root directories.

use {
	crate::{Error, Result},
	log::{debug, info},
	std::{
		io::ErrorKind,
		path::{Path, PathBuf},
	},
	walkdir::WalkDir,
};

/// Lazily yields every non-directory entry below `roots`, in the order the filesystem lists them.
///
/// Without `recursive` only the immediate entries of each root are visited. Subdirectories are
/// descended pre-order, so a directory's files and its nested directories interleave exactly as
/// `read_dir` returns them. The first unreadable directory ends the sequence with an error.
pub fn walk<'a, P>(roots: &'a [P], recursive: bool) -> impl Iterator<Item = Result<PathBuf>> + 'a
where
	P: AsRef<Path>,
{
	roots.iter().flat_map(move |root| walkRoot(root.as_ref(), recursive))
}

fn walkRoot(root: &Path, recursive: bool) -> impl Iterator<Item = Result<PathBuf>> {
	let mut entries =
		WalkDir::new(root).follow_links(true).max_depth(if recursive { usize::MAX } else { 1 }).into_iter();
	let mut failed = false;
	core::iter::from_fn(move || {
		if failed {
			return None;
		}
		loop {
			let entry = match entries.next()? {
				Ok(entry) => entry,
				Err(err) => match danglingLink(&err) {
					Some(path) => {
						debug!("{}: dangling link", path.display());
						return Some(Ok(path));
					}
					None => {
						failed = true;
						return Some(Err(Error::Walk(err)));
					}
				},
			};
			if entry.file_type().is_dir() {
				info!("Entering: {}", entry.path().display());
				continue;
			}
			if entry.depth() == 0 {
				failed = true;
				return Some(Err(Error::NotADirectory(entry.into_path())));
			}
			return Some(Ok(entry.into_path()));
		}
	})
}

// A link whose target is gone is an entry like any other file; opening it fails later and skips it.
fn danglingLink(err: &walkdir::Error) -> Option<PathBuf> {
	if err.depth() == 0 || err.loop_ancestor().is_some() || err.io_error()?.kind() != ErrorKind::NotFound {
		return None;
	}
	let path = err.path()?;
	path.symlink_metadata().ok()?.file_type().is_symlink().then(|| path.to_owned())
}

/// Whether `path` names a `.png` file, case-insensitively.
pub fn isPngName(path: &Path) -> bool {
	path.extension().and_then(|ext| ext.to_str()).map_or(false, |ext| ext.eq_ignore_ascii_case("png"))
}

#[cfg(test)]
mod tests {
	use {
		super::*,
		std::{collections::BTreeSet, fs},
		tempfile::tempdir,
	};

	fn touch(path: &Path) {
		fs::write(path, b"").unwrap();
	}

	fn collected(roots: &[PathBuf], recursive: bool) -> BTreeSet<PathBuf> {
		walk(roots, recursive).map(|result| result.unwrap()).collect()
	}

	#[test]
	fn flatWalkStaysInRoot() {
		let dir = tempdir().unwrap();
		let (a, nested) = (dir.path().join("a.png"), dir.path().join("nested"));
		touch(&a);
		fs::create_dir(&nested).unwrap();
		touch(&nested.join("b.png"));

		assert_eq!(collected(&[dir.path().to_owned()], false), BTreeSet::from([a]));
	}

	#[test]
	fn recursiveWalkVisitsSiblingsAndDescendants() {
		let dir = tempdir().unwrap();
		let deep = dir.path().join("x").join("y");
		fs::create_dir_all(&deep).unwrap();
		let files = [dir.path().join("top.png"), dir.path().join("x").join("mid.txt"), deep.join("low.PNG")];
		for file in &files {
			touch(file);
		}

		assert_eq!(collected(&[dir.path().to_owned()], true), BTreeSet::from(files));
	}

	#[test]
	fn multipleRootsAreChained() {
		let (first, second) = (tempdir().unwrap(), tempdir().unwrap());
		let (a, b) = (first.path().join("a.png"), second.path().join("b.png"));
		touch(&a);
		touch(&b);

		let walked =
			walk(&[first.path(), second.path()], false).map(|result| result.unwrap()).collect::<Vec<_>>();
		assert_eq!(walked, [a, b]);
	}

	#[test]
	fn missingRootIsFatal() {
		let dir = tempdir().unwrap();
		let roots = [dir.path().join("does-not-exist")];
		let results = walk(&roots, true).collect::<Vec<_>>();
		assert_eq!(results.len(), 1);
		assert!(matches!(results[0], Err(Error::Walk(_))));
	}

	#[test]
	fn fileRootIsRejected() {
		let dir = tempdir().unwrap();
		let file = dir.path().join("lonely.png");
		touch(&file);
		let results = walk(&[file], false).collect::<Vec<_>>();
		assert!(matches!(results.as_slice(), [Err(Error::NotADirectory(_))]));
	}

	#[cfg(unix)]
	#[test]
	fn danglingLinkIsYieldedNotFatal() {
		let dir = tempdir().unwrap();
		let (notes, stale) = (dir.path().join("notes.txt"), dir.path().join("stale.png"));
		touch(&notes);
		std::os::unix::fs::symlink(dir.path().join("gone"), &stale).unwrap();

		assert_eq!(collected(&[dir.path().to_owned()], false), BTreeSet::from([notes, stale]));
	}

	#[cfg(unix)]
	#[test]
	fn linkLoopStaysFatal() {
		let dir = tempdir().unwrap();
		std::os::unix::fs::symlink(dir.path(), dir.path().join("self")).unwrap();
		let results = walk(&[dir.path()], true).collect::<Vec<_>>();
		assert!(matches!(results.last(), Some(Err(Error::Walk(err))) if err.loop_ancestor().is_some()));
	}

	#[test]
	fn pngNameIsCaseInsensitive() {
		assert!(isPngName(Path::new("a/b/c.png")));
		assert!(isPngName(Path::new("C.PnG")));
		assert!(!isPngName(Path::new("c.png.bak")));
		assert!(!isPngName(Path::new("png")));
		assert!(!isPngName(Path::new("c.jpg")));
	}
}
