
use map_compiler::{
    artifact::decompress,
    compile::{compile_file, check_file, encode_map, parse_document, CompileError, DUMP_EXTENSION},
    schema::CURRENT_BIN_VERSION,
    settings::Settings,
};
use std::fs;


const HILLS_DOCUMENT: &'static str = r#"{
    "embedded_models": [
        {
            "name": "hills",
            "render_units": [
                {
                    "mesh": {
                        "type": 1,
                        "data": { "x_len": 8.0, "z_len": 8.0, "rows": 2, "columns": 2, "smooth": true }
                    },
                    "material": { "diffuse_map": "grass" }
                }
            ],
            "static_actors": [ { "name": "hills_1", "transform": { "pos": [0.0, -2.0, 0.0] } } ]
        }
    ],
    "imported_models": [
        { "resource_id": "tower", "static_actors": [ { "name": "tower_1" } ] }
    ],
    "water_planes": [ { "width": 4.0, "height": 4.0 } ]
}"#;

#[test]
fn test_compile_file_writes_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("hills.json");
    fs::write(&source, HILLS_DOCUMENT).unwrap();

    let mut settings = Settings::default();
    settings.output_dir = Some(dir.path().join("out"));
    settings.dump_json = true;

    let out = compile_file(&source, &settings).unwrap();
    assert_eq!(out, dir.path().join("out").join("hills.dlb"));

    let artifact = fs::read(&out).unwrap();
    let binary = decompress(&artifact).unwrap();
    assert_eq!(&artifact[..4], &(binary.len() as i32).to_le_bytes());
    assert_eq!(&binary[..4], &CURRENT_BIN_VERSION.to_le_bytes());

    let map = parse_document(HILLS_DOCUMENT).unwrap();
    assert_eq!(binary, encode_map(&map).unwrap());

    // the normalized dump parses back into the same tree
    let dump = fs::read_to_string(out.with_extension(DUMP_EXTENSION)).unwrap();
    assert_eq!(parse_document(&dump).unwrap(), map);
}

#[test]
fn test_invalid_document_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("broken.json");
    fs::write(&source, r#"{ "embedded_models": [ { "name": "empty" } ] }"#).unwrap();

    let settings = Settings::default();
    match compile_file(&source, &settings) {
        Err(CompileError::Validation { report }) => {
            assert!(report.contains("[ERROR]"), "report was:\n{}", report);
        }
        other => panic!("expected a validation failure, got {:?}", other),
    }
    assert!(!dir.path().join("broken.dlb").exists());
    assert!(check_file(&source, &settings).is_err());
}

#[test]
fn test_missing_source_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nowhere.json");
    let e = compile_file(&missing, &Settings::default()).unwrap_err();
    assert!(matches!(e, CompileError::Io { .. }));
}

#[test]
fn test_failed_dump_writes_no_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("hills.json");
    fs::write(&source, HILLS_DOCUMENT).unwrap();
    // a folder where the dump should go makes the dump write fail
    fs::create_dir(dir.path().join("hills").with_extension(DUMP_EXTENSION)).unwrap();

    let mut settings = Settings::default();
    settings.dump_json = true;
    let e = compile_file(&source, &settings).unwrap_err();
    assert!(matches!(e, CompileError::Io { .. }));
    assert!(!dir.path().join("hills.dlb").exists());
}
