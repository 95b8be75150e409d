//! Fixed-width little-endian binary primitives.
//!
//! Every node in the tree serializes through `BinWriter`. Integers are
//! written at a fixed width chosen by the caller, floats are always `f32`,
//! booleans are one byte, and strings are UTF-8 followed by a NUL byte.
//! `BinReader` is the mirror image, used for inspecting artifacts.

use crate::{
    error::Result,
    err,
    bail,
    ensure,
};


/// Append-only byte sink for node encoding.
#[derive(Debug, Clone, Default)]
pub struct BinWriter {
    buf: Vec<u8>,
}

impl BinWriter {
    pub fn new() -> Self {
        BinWriter::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_i16(&mut self, n: i16) {
        self.write_raw(&n.to_le_bytes());
    }

    pub fn write_i32(&mut self, n: i32) {
        self.write_raw(&n.to_le_bytes());
    }

    pub fn write_f32(&mut self, n: f32) {
        self.write_raw(&n.to_le_bytes());
    }

    pub fn write_bool(&mut self, b: bool) {
        self.buf.push(b as u8);
    }

    /// Write an `i16` from a wider integer, failing if it doesn't fit.
    pub fn write_i16_checked<N>(&mut self, n: N) -> Result<()>
    where
        N: TryInto<i16> + Copy + std::fmt::Display,
    {
        let narrow = n
            .try_into()
            .map_err(|_| err!(Range, "{} does not fit in a 2-byte integer", n))?;
        self.write_i16(narrow);
        Ok(())
    }

    /// Write a length or count as an `i32`, failing if it doesn't fit.
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        let n = i32::try_from(len)
            .map_err(|_| err!(Range, "length {} does not fit in a 4-byte integer", len))?;
        self.write_i32(n);
        Ok(())
    }

    /// Write a NUL-terminated UTF-8 string. Interior NUL bytes would make the
    /// string unreadable, so they are rejected.
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        ensure!(
            !s.as_bytes().contains(&0),
            Range,
            "string {:?} contains a NUL byte",
            s,
        );
        self.write_raw(s.as_bytes());
        self.buf.push(0);
        Ok(())
    }

    /// Write an `i32` element count followed by every float.
    pub fn write_f32_slice(&mut self, floats: &[f32]) -> Result<()> {
        self.write_len(floats.len())?;
        self.buf.reserve(floats.len() * 4);
        for &f in floats {
            self.write_f32(f);
        }
        Ok(())
    }
}


/// Cursor over encoded bytes.
#[derive(Debug, Clone)]
pub struct BinReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BinReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        BinReader { bytes, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        ensure!(
            self.remaining() >= N,
            Structure,
            "needed {} bytes at offset {}, only {} remain",
            N,
            self.pos,
            self.remaining(),
        );
        let mut buf = [0; N];
        buf.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        Ok(buf)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.take().map(i16::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.take().map(i32::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.take().map(f32::from_le_bytes)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.take::<1>()? {
            [0] => Ok(false),
            [1] => Ok(true),
            [b] => bail!(Structure, "invalid bool byte {:#04x} at offset {}", b, self.pos - 1),
        }
    }

    pub fn read_len(&mut self) -> Result<usize> {
        let n = self.read_i32()?;
        usize::try_from(n).map_err(|_| err!(Structure, "negative length {}", n))
    }

    pub fn read_str(&mut self) -> Result<String> {
        let rest = &self.bytes[self.pos..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| err!(Structure, "unterminated string at offset {}", self.pos))?;
        let s = std::str::from_utf8(&rest[..nul])
            .map_err(|e| err!(Structure, "invalid utf8 at offset {}: {}", self.pos, e))?
            .to_owned();
        self.pos += nul + 1;
        Ok(s)
    }

    pub fn read_f32_vec(&mut self) -> Result<Vec<f32>> {
        let len = self.read_len()?;
        ensure!(
            self.remaining() >= len * 4,
            Structure,
            "float array of {} elements overruns buffer",
            len,
        );
        (0..len).map(|_| self.read_f32()).collect()
    }
}


#[test]
fn test_little_endian_layout() {
    let mut w = BinWriter::new();
    w.write_i32(1);
    w.write_i16(-2);
    w.write_f32(1.0);
    w.write_bool(true);
    w.write_str("ab").unwrap();
    assert_eq!(
        w.as_bytes(),
        &[
            1, 0, 0, 0,
            0xfe, 0xff,
            0x00, 0x00, 0x80, 0x3f,
            1,
            b'a', b'b', 0,
        ],
    );
}

#[test]
fn test_i16_overflow_is_rejected() {
    let mut w = BinWriter::new();
    assert!(w.write_i16_checked(40_000i32).is_err());
    assert!(w.is_empty());
    w.write_i16_checked(300i32).unwrap();
    assert_eq!(w.as_bytes(), &[0x2c, 0x01]);
}

#[test]
fn test_reader_reads_back_writer() {
    let mut w = BinWriter::new();
    w.write_str("model").unwrap();
    w.write_f32_slice(&[0.5, -3.0]).unwrap();
    w.write_bool(false);

    let bytes = w.into_bytes();
    let mut r = BinReader::new(&bytes);
    assert_eq!(r.read_str().unwrap(), "model");
    assert_eq!(r.read_f32_vec().unwrap(), vec![0.5, -3.0]);
    assert!(!r.read_bool().unwrap());
    assert!(r.is_finished());
    assert!(r.read_i32().is_err());
}
