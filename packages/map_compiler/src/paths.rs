//! Path helpers for locating outputs next to their sources.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};


/// A path split into containing folder, file stem and extension. Missing
/// parts are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPath {
    pub folder: PathBuf,
    pub stem: String,
    pub extension: String,
}

pub fn split_path(path: &Path) -> SplitPath {
    SplitPath {
        folder: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        stem: path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        extension: path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// Where the artifact for `source` goes: `out_dir` if given, otherwise the
/// source's own folder, with the extension replaced.
pub fn output_path_for(source: &Path, out_dir: Option<&Path>, extension: &str) -> PathBuf {
    let split = split_path(source);
    let folder = out_dir.map(Path::to_path_buf).unwrap_or(split.folder);
    folder.join(format!("{}.{}", split.stem, extension))
}

/// Create every missing folder above `path`.
pub fn create_parent_dirs(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}


#[test]
fn test_split_path() {
    let split = split_path(Path::new("maps/city/downtown.json"));
    assert_eq!(split.folder, PathBuf::from("maps/city"));
    assert_eq!(split.stem, "downtown");
    assert_eq!(split.extension, "json");

    let split = split_path(Path::new("bare"));
    assert_eq!(split.folder, PathBuf::new());
    assert_eq!(split.extension, "");
}

#[test]
fn test_output_path_for() {
    let src = Path::new("maps/city/downtown.json");
    assert_eq!(output_path_for(src, None, "dlb"), PathBuf::from("maps/city/downtown.dlb"));
    assert_eq!(
        output_path_for(src, Some(Path::new("out")), "dlb"),
        PathBuf::from("out/downtown.dlb"),
    );
}
