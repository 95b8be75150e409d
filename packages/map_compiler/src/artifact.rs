//! On-disk artifact framing: the uncompressed length as an `i32`, then the
//! binary map as a zlib stream.

use map_node::{
    bin::{BinWriter, BinReader},
    error::Result,
    ensure,
};
use flate2::{
    Compression,
    read::ZlibDecoder,
    write::ZlibEncoder,
};
use std::io::{Read, Write};


pub const ARTIFACT_EXTENSION: &'static str = "dlb";

/// Compression level used when none is configured.
pub const BEST_COMPRESSION: u32 = 9;


pub fn compress(binary: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut header = BinWriter::new();
    header.write_len(binary.len())?;

    let mut encoder = ZlibEncoder::new(header.into_bytes(), Compression::new(level.min(9)));
    encoder.write_all(binary)?;
    Ok(encoder.finish()?)
}

/// Restore the binary map from an artifact, checking the declared length.
pub fn decompress(artifact: &[u8]) -> Result<Vec<u8>> {
    let mut reader = BinReader::new(artifact);
    let len = reader.read_len()?;

    // at most one byte past the declared length, enough to spot a longer stream
    let mut decoder = ZlibDecoder::new(&artifact[reader.position()..]).take(len as u64 + 1);
    let mut binary = Vec::new();
    decoder.read_to_end(&mut binary)?;
    ensure!(
        binary.len() == len,
        Structure,
        "artifact declares {} bytes but holds {}",
        len,
        binary.len(),
    );
    Ok(binary)
}


#[test]
fn test_artifact_framing() {
    let binary = b"map map map map map map map map".repeat(20);
    let artifact = compress(&binary, BEST_COMPRESSION).unwrap();
    assert_eq!(&artifact[..4], &(binary.len() as i32).to_le_bytes());
    // zlib header
    assert_eq!(artifact[4], 0x78);
    assert!(artifact.len() < binary.len());
    assert_eq!(decompress(&artifact).unwrap(), binary);

    let mut lying = artifact.clone();
    lying[0] = lying[0].wrapping_add(1);
    assert!(decompress(&lying).is_err());
    assert!(decompress(&artifact[..3]).is_err());
}

#[test]
fn test_header_is_not_trusted() {
    let binary = vec![7u8; 64];
    let mut artifact = compress(&binary, BEST_COMPRESSION).unwrap();
    artifact[..4].copy_from_slice(&i32::MAX.to_le_bytes());
    let e = decompress(&artifact).unwrap_err();
    assert_eq!(e.kind(), map_node::ErrorKind::Structure);

    artifact[..4].copy_from_slice(&10i32.to_le_bytes());
    assert!(decompress(&artifact).is_err());
}
