//! Little-Endian-Leser über einem Byte-Slice mit Längenprüfung.

use crate::serialization::error::SerializationError;

pub(super) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(super) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(super) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(super) fn take(
        &mut self,
        len: usize,
        context: &'static str,
    ) -> Result<&'a [u8], SerializationError> {
        if len > self.remaining() {
            return Err(SerializationError::Truncated {
                context,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn array<const N: usize>(
        &mut self,
        context: &'static str,
    ) -> Result<[u8; N], SerializationError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, context)?);
        Ok(out)
    }

    pub(super) fn u8(&mut self, context: &'static str) -> Result<u8, SerializationError> {
        Ok(self.array::<1>(context)?[0])
    }

    pub(super) fn u32(&mut self, context: &'static str) -> Result<u32, SerializationError> {
        Ok(u32::from_le_bytes(self.array(context)?))
    }

    pub(super) fn u64(&mut self, context: &'static str) -> Result<u64, SerializationError> {
        Ok(u64::from_le_bytes(self.array(context)?))
    }

    pub(super) fn f32(&mut self, context: &'static str) -> Result<f32, SerializationError> {
        Ok(f32::from_le_bytes(self.array(context)?))
    }

    /// Liest eine Elementanzahl und prüft, dass `count * min_element_size`
    /// Bytes überhaupt noch vorhanden sind, bevor jemand allokiert.
    pub(super) fn count(
        &mut self,
        min_element_size: usize,
        context: &'static str,
    ) -> Result<usize, SerializationError> {
        let count = self.u32(context)? as usize;
        let needed = count.saturating_mul(min_element_size);
        if needed > self.remaining() {
            return Err(SerializationError::Truncated {
                context,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(count)
    }

    /// Längenpräfixierter UTF-8-String, Länge 0 = kein Wert
    pub(super) fn string(
        &mut self,
        context: &'static str,
    ) -> Result<Option<String>, SerializationError> {
        let len = self.u32(context)? as usize;
        if len == 0 {
            return Ok(None);
        }
        let bytes = self.take(len, context)?;
        let text = std::str::from_utf8(bytes)
            .map_err(|e| SerializationError::malformed(format!("{context}: kein UTF-8 ({e})")))?;
        Ok(Some(text.to_owned()))
    }

    /// Fehler, falls noch Bytes übrig sind
    pub(super) fn finish(self) -> Result<(), SerializationError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(SerializationError::TrailingBytes(n)),
        }
    }
}
