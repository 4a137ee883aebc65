use std::fs;
use std::path::{Path, PathBuf};
use std::{env, io};

use crate::error::{MarkovError, Result};
use crate::model::Sequence;
use crate::model::parser;

/// Reads a whole training file into memory.
///
/// Line endings are left untouched; the parser normalises them.
pub fn read_text<P: AsRef<Path>>(filename: P) -> Result<String> {
	let path = filename.as_ref();
	fs::read_to_string(path).map_err(|source| MarkovError::Io { path: path.to_owned(), source })
}

/// Loads the sequences of a training file.
///
/// - If a `<stem>.bin` snapshot sits next to the file and is not older than
///   it, the sequences are decoded from the snapshot with `postcard`.
/// - Otherwise the text is parsed and the snapshot is (re)written so the
///   next load is fast. Failing to write the snapshot is only logged.
///
/// Symbols are not filtered against a vocabulary here; that happens when
/// the sequences are imported into a corpus store.
pub fn load_training<P: AsRef<Path>>(filepath: P) -> Result<Vec<Sequence>> {
	let path = filepath.as_ref();
	let snapshot_path = build_output_path(path, "bin")
		.map_err(|source| MarkovError::Io { path: path.to_owned(), source })?;

	if is_fresh(&snapshot_path, path) {
		let bytes = fs::read(&snapshot_path)
			.map_err(|source| MarkovError::Io { path: snapshot_path.clone(), source })?;
		let sequences: Vec<Sequence> = postcard::from_bytes(&bytes)?;
		log::debug!("loaded {} sequences from snapshot {}", sequences.len(), snapshot_path.display());
		return Ok(sequences);
	}

	let sequences = parser::parse(&read_text(path)?);
	let bytes = postcard::to_stdvec(&sequences)?;
	if let Err(e) = fs::write(&snapshot_path, bytes) {
		log::warn!("could not write snapshot {}: {e}", snapshot_path.display());
	}
	log::info!("parsed {} sequences from {}", sequences.len(), path.display());

	Ok(sequences)
}

/// True when `snapshot` is a file written after `source` last changed.
fn is_fresh(snapshot: &Path, source: &Path) -> bool {
	if !snapshot.is_file() {
		return false;
	}
	let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
	match (modified(snapshot), modified(source)) {
		(Some(snapshot_time), Some(source_time)) => snapshot_time >= source_time,
		(Some(_), None) => true,
		_ => false,
	}
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/level.txt` + `"bin"` → `data/level.bin`
pub fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/level.txt"` → `"level"`
/// - `"level.txt"` → `"level"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists all files with a given extension in a directory, sorted by name.
///
/// Returns file names only (no paths).
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::{Duration, SystemTime};

	#[test]
	fn output_path_swaps_extension() {
		let path = build_output_path("data/level.txt", "bin").unwrap();
		assert_eq!(path, PathBuf::from("data/level.bin"));
	}

	#[test]
	fn filename_drops_directory_and_extension() {
		assert_eq!(get_filename("./data/level.txt").unwrap(), "level");
		assert_eq!(get_filename("level.txt").unwrap(), "level");
	}

	#[test]
	fn load_training_writes_and_reuses_snapshot() {
		let dir = tempfile::tempdir().unwrap();
		let text_path = dir.path().join("strip.txt");
		fs::write(&text_path, "0,1,2.\n3,4").unwrap();

		let first = load_training(&text_path).unwrap();
		assert_eq!(first, vec![vec![0, 1, 2], vec![3, 4]]);
		assert!(dir.path().join("strip.bin").exists());

		let second = load_training(&text_path).unwrap();
		assert_eq!(first, second);
	}

	#[test]
	fn stale_snapshot_is_rebuilt() {
		let dir = tempfile::tempdir().unwrap();
		let text_path = dir.path().join("strip.txt");
		fs::write(&text_path, "0,1,2").unwrap();
		assert_eq!(load_training(&text_path).unwrap(), vec![vec![0, 1, 2]]);

		fs::write(&text_path, "3,4").unwrap();
		let later = SystemTime::now() + Duration::from_secs(60);
		fs::File::options().write(true).open(&text_path).unwrap().set_modified(later).unwrap();

		assert_eq!(load_training(&text_path).unwrap(), vec![vec![3, 4]]);
	}

	#[test]
	fn unwritable_snapshot_still_loads() {
		let dir = tempfile::tempdir().unwrap();
		let text_path = dir.path().join("strip.txt");
		fs::write(&text_path, "0,1.2").unwrap();
		// A directory where the snapshot should go makes the write fail.
		fs::create_dir(dir.path().join("strip.bin")).unwrap();

		assert_eq!(load_training(&text_path).unwrap(), vec![vec![0, 1], vec![2]]);
		assert!(dir.path().join("strip.bin").is_dir());
	}

	#[test]
	fn list_files_filters_by_extension() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("b.txt"), "1").unwrap();
		fs::write(dir.path().join("a.txt"), "1").unwrap();
		fs::write(dir.path().join("a.bin"), "1").unwrap();

		let files = list_files(dir.path(), "txt").unwrap();
		assert_eq!(files, vec!["a.txt".to_owned(), "b.txt".to_owned()]);
	}

	#[test]
	fn read_text_reports_missing_file() {
		let err = read_text("definitely/not/here.txt").unwrap_err();
		assert!(matches!(err, MarkovError::Io { .. }));
	}
}
