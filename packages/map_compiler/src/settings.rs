
use crate::artifact::{ARTIFACT_EXTENSION, BEST_COMPRESSION};
use map_node::journal::Severity;
use std::{
    path::{Path, PathBuf},
    fs::File,
    io::{
        BufReader,
        BufWriter,
    },
};
use serde::{Serialize, Deserialize};
use anyhow::*;


pub const SETTINGS_FILE_NAME: &'static str = "mapc.json";


/// Compiler settings, read from the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Write artifacts here instead of next to their sources.
    pub output_dir: Option<PathBuf>,
    pub output_extension: String,
    /// zlib level, 0 to 9.
    pub compression_level: u32,
    /// Least severe note shown when a report is printed.
    pub report_threshold: Severity,
    /// Also write the normalized document text next to each artifact.
    pub dump_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            output_dir: None,
            output_extension: ARTIFACT_EXTENSION.to_owned(),
            compression_level: BEST_COMPRESSION,
            report_threshold: Severity::Warn,
            dump_json: false,
        }
    }
}

impl Settings {
    pub fn read(path: impl AsRef<Path>) -> Self {
        Self::try_read(path).unwrap_or_default()
    }

    pub fn try_read(path: impl AsRef<Path>) -> Result<Self> {
        let settings: Settings = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        ensure!(
            settings.compression_level <= 9,
            "compression level {} is above 9",
            settings.compression_level,
        );
        Ok(settings)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), self)?;
        Ok(())
    }
}


#[test]
fn test_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);

    assert_eq!(Settings::read(&path), Settings::default());
    assert!(Settings::try_read(&path).is_err());

    std::fs::write(&path, r#"{ "dump_json": true, "report_threshold": "info" }"#).unwrap();
    let settings = Settings::read(&path);
    assert!(settings.dump_json);
    assert_eq!(settings.report_threshold, Severity::Info);
    assert_eq!(settings.output_extension, "dlb");

    let mut changed = settings.clone();
    changed.compression_level = 3;
    changed.write(&path).unwrap();
    assert_eq!(Settings::try_read(&path).unwrap(), changed);

    std::fs::write(&path, r#"{ "compression_level": 12 }"#).unwrap();
    assert!(Settings::try_read(&path).is_err());
}
