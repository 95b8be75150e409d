//! The compile pipeline, from document text to the artifact on disk.

use crate::{
    artifact,
    paths::{output_path_for, create_parent_dirs},
    schema::MapChunkBuilder,
    settings::Settings,
};
use map_node::{
    journal::{ErrorJournal, Severity},
    node::{MapNode, encode_to_vec, from_json},
};
use std::{
    fmt::{self, Formatter, Display},
    fs,
    io,
    path::{Path, PathBuf},
};


/// Extension of the normalized document written beside an artifact.
pub const DUMP_EXTENSION: &'static str = "normalized.json";


#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    ParseText,
    Validate,
    DeriveGeometry,
    EncodeBinary,
    Compress,
    Write,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Stage::ParseText => "parse text",
            Stage::Validate => "validate",
            Stage::DeriveGeometry => "derive geometry",
            Stage::EncodeBinary => "encode binary",
            Stage::Compress => "compress",
            Stage::Write => "write",
        })
    }
}


#[derive(Debug)]
pub enum CompileError {
    Io {
        path: PathBuf,
        error: io::Error,
    },
    /// Not well-formed JSON.
    Parse(serde_json::Error),
    /// Well-formed JSON that does not fit the document tree.
    Structure(map_node::Error),
    /// The report contains at least one error. Holds the rendered report.
    Validation {
        report: String,
    },
    /// Geometry derivation or binary encoding failed.
    Encode(map_node::Error),
    Compress(map_node::Error),
}

impl CompileError {
    pub fn stage(&self) -> Stage {
        match self {
            CompileError::Io { .. } => Stage::Write,
            CompileError::Parse(_) => Stage::ParseText,
            CompileError::Structure(_) => Stage::ParseText,
            CompileError::Validation { .. } => Stage::Validate,
            CompileError::Encode(e) if e.kind() == map_node::ErrorKind::Geometry => Stage::DeriveGeometry,
            CompileError::Encode(_) => Stage::EncodeBinary,
            CompileError::Compress(_) => Stage::Compress,
        }
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} failed: ", self.stage())?;
        match self {
            CompileError::Io { path, error } => write!(f, "{}: {}", path.display(), error),
            CompileError::Parse(e) => Display::fmt(e, f),
            CompileError::Structure(e) => Display::fmt(e, f),
            CompileError::Validation { report } => write!(f, "document has errors\n{}", report),
            CompileError::Encode(e) => Display::fmt(e, f),
            CompileError::Compress(e) => Display::fmt(e, f),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Io { error, .. } => Some(error),
            CompileError::Parse(e) => Some(e),
            CompileError::Structure(e) => Some(e),
            CompileError::Validation { .. } => None,
            CompileError::Encode(e) => Some(e),
            CompileError::Compress(e) => Some(e),
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> CompileError + '_ {
    move |error| CompileError::Io {
        path: path.to_owned(),
        error,
    }
}


/// Parse document text into a tree. Unknown keys are ignored and missing
/// keys take their defaults.
pub fn parse_document(text: &str) -> Result<MapChunkBuilder, CompileError> {
    let json = serde_json::from_str(text).map_err(CompileError::Parse)?;
    from_json(&json).map_err(CompileError::Structure)
}

/// Inspect the whole tree. Errors anywhere abort with the rendered report,
/// warnings are logged and the report is returned.
pub fn validate(map: &MapChunkBuilder, threshold: Severity) -> Result<ErrorJournal, CompileError> {
    let journal = map.report();
    if journal.has_error() {
        let (report, _) = journal.render(threshold.min(Severity::Error));
        return Err(CompileError::Validation { report });
    }
    if journal.has_warn_or_worse() {
        let (report, count) = journal.render(threshold.min(Severity::Warn));
        warn!("{} note(s) in document report\n{}", count, report);
    }
    Ok(journal)
}

/// Derive colliders and write the binary map.
pub fn encode_map(map: &MapChunkBuilder) -> Result<Vec<u8>, CompileError> {
    encode_to_vec(map).map_err(CompileError::Encode)
}

pub fn to_pretty_json(map: &MapChunkBuilder) -> String {
    // serializing a Value cannot fail
    serde_json::to_string_pretty(&map.to_json()).unwrap_or_default()
}

/// Validate, encode and compress a parsed document.
fn compile_map(map: &MapChunkBuilder, settings: &Settings) -> Result<Vec<u8>, CompileError> {
    validate(map, settings.report_threshold)?;
    let binary = encode_map(map)?;
    debug!(bytes = binary.len(), "encoded binary map");
    let artifact = artifact::compress(&binary, settings.compression_level)
        .map_err(CompileError::Compress)?;
    debug!(bytes = artifact.len(), "compressed artifact");
    Ok(artifact)
}

/// Run every in-memory stage and return the artifact bytes.
pub fn compile_document(text: &str, settings: &Settings) -> Result<Vec<u8>, CompileError> {
    let map = parse_document(text)?;
    debug!(models = map.embedded_models.len(), imported = map.imported_models.len(), "parsed document");
    compile_map(&map, settings)
}

/// Compile the document at `path` and write its artifact, returning where it
/// was written. Nothing is written if any in-memory stage fails, and the
/// artifact is only written once the optional dump is on disk.
pub fn compile_file(path: &Path, settings: &Settings) -> Result<PathBuf, CompileError> {
    info!(path = %path.display(), "compiling");
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    let map = parse_document(&text)?;
    let artifact = compile_map(&map, settings)?;

    let out_path = output_path_for(path, settings.output_dir.as_deref(), &settings.output_extension);
    create_parent_dirs(&out_path).map_err(io_error(&out_path))?;
    let dump_path = out_path.with_extension(DUMP_EXTENSION);
    if settings.dump_json {
        fs::write(&dump_path, to_pretty_json(&map)).map_err(io_error(&dump_path))?;
        debug!(path = %dump_path.display(), "wrote normalized document");
    }
    if let Err(e) = fs::write(&out_path, &artifact) {
        if settings.dump_json {
            let _ = fs::remove_file(&dump_path);
        }
        return Err(io_error(&out_path)(e));
    }
    info!(path = %out_path.display(), compressed = artifact.len(), "wrote artifact");
    Ok(out_path)
}

/// Parse and validate without writing anything.
pub fn check_file(path: &Path, settings: &Settings) -> Result<ErrorJournal, CompileError> {
    info!(path = %path.display(), "checking");
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    let map = parse_document(&text)?;
    validate(&map, settings.report_threshold)
}


#[cfg(test)]
const CRATE_DOCUMENT: &'static str = r#"{
    "metadata": { "bin_version": 1 },
    "embedded_models": [
        {
            "name": "crate",
            "render_units": [
                {
                    "mesh": { "type": 0, "data": { "smooth": true } },
                    "material": { "diffuse_map": "planks", "shininess": 8.0 }
                }
            ],
            "static_actors": [ { "name": "first" } ],
            "detailed_collider": true
        }
    ],
    "point_lights": [ { "max_dist": 12.0 } ]
}"#;

#[test]
fn test_compile_is_deterministic() {
    let settings = Settings::default();
    let a = compile_document(CRATE_DOCUMENT, &settings).unwrap();
    let b = compile_document(CRATE_DOCUMENT, &settings).unwrap();
    assert_eq!(a, b);

    let binary = artifact::decompress(&a).unwrap();
    let map = parse_document(CRATE_DOCUMENT).unwrap();
    assert_eq!(binary, encode_map(&map).unwrap());
}

#[test]
fn test_unknown_keys_are_ignored() {
    let with_extra = CRATE_DOCUMENT.replacen(
        r#""metadata": { "bin_version": 1 },"#,
        r#""metadata": { "bin_version": 1, "author": "someone" }, "skybox": [1, 2, 3],"#,
        1,
    );
    assert_ne!(with_extra, CRATE_DOCUMENT);
    assert_eq!(parse_document(&with_extra).unwrap(), parse_document(CRATE_DOCUMENT).unwrap());
}

#[test]
fn test_default_document_round_trip() {
    let map = MapChunkBuilder::default();
    let text = to_pretty_json(&map);
    assert_eq!(parse_document(&text).unwrap(), map);
    assert_eq!(parse_document("{}").unwrap(), map);

    let map = parse_document(CRATE_DOCUMENT).unwrap();
    assert_eq!(parse_document(&to_pretty_json(&map)).unwrap(), map);
}

#[test]
fn test_every_error_is_reported() {
    let text = r#"{
        "embedded_models": [
            { "name": "hollow", "static_actors": [ { "name": "a" } ] },
            {
                "name": "bare",
                "render_units": [ {} ],
                "static_actors": [ { "name": "b" } ]
            }
        ],
        "imported_models": [ { "static_actors": [ { "name": "c" } ] } ]
    }"#;
    let map = parse_document(text).unwrap();
    let report = match validate(&map, Severity::Info) {
        Err(CompileError::Validation { report }) => report,
        other => panic!("expected a validation failure, got {:?}", other),
    };
    assert!(report.contains("model has no render units"));
    assert!(report.contains("diffuse map is not defined"));
    assert!(report.contains("resource identifier is not defined"));
    assert_eq!(map.report().render(Severity::Error).1, 3);

    let e = compile_document(text, &Settings::default()).unwrap_err();
    assert_eq!(e.stage(), Stage::Validate);
}

#[test]
fn test_structure_errors_name_their_path() {
    let text = r#"{ "embedded_models": [ { "render_units": [ { "mesh": { "type": 7, "data": {} } } ] } ] }"#;
    match parse_document(text) {
        Err(CompileError::Structure(e)) => {
            let path = e.path().join(".");
            assert!(path.starts_with("embedded_models"), "path was {}", path);
        }
        other => panic!("expected a structure error, got {:?}", other),
    }

    assert!(matches!(parse_document("{ not json"), Err(CompileError::Parse(_))));
}

#[test]
fn test_non_finite_value_stops_encoding() {
    let mut map = parse_document(r#"{ "water_planes": [ {} ] }"#).unwrap();
    map.water_planes.iter_mut().for_each(|water| water.width.set(f32::INFINITY));
    match encode_map(&map) {
        Err(CompileError::Encode(e)) => {
            assert_eq!(e.kind(), map_node::ErrorKind::Range);
            assert_eq!(e.path()[0], "water_planes");
        }
        other => panic!("expected an encode failure, got {:?}", other),
    }

    let text = r#"{ "water_planes": [ { "width": 1e39 } ] }"#;
    assert!(matches!(parse_document(text), Err(CompileError::Structure(_))));
}
