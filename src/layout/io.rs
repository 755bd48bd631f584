//! Big-endian binary primitives for the layout stream.
//!
//! Readers work on a fully loaded buffer so a truncated file fails before any
//! part of it is applied.

use crate::error::{DockError, DockResult};

#[derive(Debug, Default)]
pub struct DataWriter {
    buf: Vec<u8>,
}

impl DataWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Counts and indices; stored as a non-negative `i32`.
    pub fn write_len(&mut self, value: usize) {
        self.write_i32(i32::try_from(value).unwrap_or(i32::MAX));
    }

    pub fn write_utf(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    pub fn write_opt_utf(&mut self, value: Option<&str>) {
        self.write_bool(value.is_some());
        if let Some(value) = value {
            self.write_utf(value);
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_len(bytes.len());
        self.buf.extend_from_slice(bytes);
    }
}

#[derive(Debug)]
pub struct DataReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> DataReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn take(&mut self, count: usize) -> DockResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| {
                DockError::format(format!(
                    "unexpected end of layout data at byte {} (wanted {count} more)",
                    self.pos
                ))
            })?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> DockResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_bool(&mut self) -> DockResult<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DockError::format(format!("invalid boolean byte {other}"))),
        }
    }

    pub fn read_u8(&mut self) -> DockResult<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> DockResult<u16> {
        Ok(u16::from_be_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> DockResult<i32> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    pub fn read_f32(&mut self) -> DockResult<f32> {
        Ok(f32::from_be_bytes(self.take_array()?))
    }

    pub fn read_len(&mut self) -> DockResult<usize> {
        let value = self.read_i32()?;
        usize::try_from(value).map_err(|_| DockError::format(format!("negative length {value}")))
    }

    pub fn read_utf(&mut self) -> DockResult<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes).map_err(|err| DockError::format(format!("invalid utf-8: {err}")))
    }

    pub fn read_opt_utf(&mut self) -> DockResult<Option<String>> {
        if self.read_bool()? {
            Ok(Some(self.read_utf()?))
        } else {
            Ok(None)
        }
    }

    pub fn read_bytes(&mut self) -> DockResult<Vec<u8>> {
        let len = self.read_len()?;
        Ok(self.take(len)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_big_endian() {
        let mut out = DataWriter::new();
        out.write_i32(1);
        out.write_u16(0x0102);
        assert_eq!(out.into_inner(), vec![0, 0, 0, 1, 1, 2]);
    }

    #[test]
    fn strings_and_options() {
        let mut out = DataWriter::new();
        out.write_utf("ünïcode");
        out.write_opt_utf(None);
        out.write_opt_utf(Some("x"));
        out.write_f32(0.25);
        let bytes = out.into_inner();
        let mut input = DataReader::new(&bytes);
        assert_eq!(input.read_utf().unwrap(), "ünïcode");
        assert_eq!(input.read_opt_utf().unwrap(), None);
        assert_eq!(input.read_opt_utf().unwrap().as_deref(), Some("x"));
        assert_eq!(input.read_f32().unwrap(), 0.25);
        assert!(input.is_at_end());
    }

    #[test]
    fn truncated_input_is_a_format_error() {
        let mut out = DataWriter::new();
        out.write_utf("hello");
        let bytes = out.into_inner();
        let mut input = DataReader::new(&bytes[..6]);
        assert!(matches!(input.read_utf(), Err(DockError::Format(_))));
    }

    #[test]
    fn negative_length_is_rejected() {
        let bytes = (-1i32).to_be_bytes();
        let mut input = DataReader::new(&bytes);
        assert!(input.read_len().is_err());
    }
}
