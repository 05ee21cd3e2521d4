//! codec — курсоры кодирования/декодирования записи поверх буфера слота.
//!
//! Дисциплина: каждый put_*/take_* сверяется с очередным объявленным
//! полем раскладки (kind и ширина), finish() требует, чтобы запись была
//! заполнена/прочитана целиком. Несовпадение формы writer/reader падает
//! на первом же поле, а не портит offset-арифметику молча.
//!
//! Скаляры — little-endian (byteorder), str — UTF-8 с NUL-паддингом до
//! ширины поля, bytes — сырые байты ровно по ширине.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::StoreError;
use crate::record::layout::{Field, FieldKind, RecordLayout};

/// Типизированная запись фиксированной формы.
///
/// layout() — чистое описание формы; encode()/decode() обязаны пройти
/// все поля по порядку. Store сверяет layout() со своей раскладкой при
/// каждом типизированном вызове.
pub trait RecordCodec: Sized {
    fn layout() -> RecordLayout;
    fn encode(&self, enc: &mut RecordEncoder<'_>) -> Result<(), StoreError>;
    fn decode(dec: &mut RecordDecoder<'_>) -> Result<Self, StoreError>;
}

/// Закодировать запись в буфер ровно record_len байт.
pub fn encode_record<R: RecordCodec>(
    layout: &RecordLayout,
    rec: &R,
    buf: &mut [u8],
) -> Result<(), StoreError> {
    if buf.len() != layout.record_len() {
        return Err(StoreError::Encode(format!(
            "buffer {} B != record_len {} B",
            buf.len(),
            layout.record_len()
        )));
    }
    let mut enc = RecordEncoder::new(layout, buf);
    rec.encode(&mut enc)?;
    enc.finish()
}

/// Раскодировать запись из буфера ровно record_len байт.
pub fn decode_record<R: RecordCodec>(layout: &RecordLayout, buf: &[u8]) -> Result<R, StoreError> {
    if buf.len() != layout.record_len() {
        return Err(StoreError::Decode(format!(
            "buffer {} B != record_len {} B",
            buf.len(),
            layout.record_len()
        )));
    }
    let mut dec = RecordDecoder::new(layout, buf);
    let rec = R::decode(&mut dec)?;
    dec.finish()?;
    Ok(rec)
}

/// Последовательный курсор записи. Буфер обнуляется при создании, так
/// что паддинг и незатронутые байты детерминированы.
pub struct RecordEncoder<'a> {
    layout: &'a RecordLayout,
    buf: &'a mut [u8],
    pos: usize,
    next: usize,
}

impl<'a> RecordEncoder<'a> {
    pub(crate) fn new(layout: &'a RecordLayout, buf: &'a mut [u8]) -> Self {
        buf.fill(0);
        Self {
            layout,
            buf,
            pos: 0,
            next: 0,
        }
    }

    fn field(&self) -> Result<&Field, StoreError> {
        self.layout.fields().get(self.next).ok_or_else(|| {
            StoreError::Encode(format!(
                "record already complete ({} fields)",
                self.layout.fields().len()
            ))
        })
    }

    fn mismatch(&self, asked: &str) -> StoreError {
        let f = &self.layout.fields()[self.next];
        StoreError::Encode(format!(
            "field {} '{}' is {}, not {}",
            self.next, f.name, f.kind, asked
        ))
    }

    /// Проверить kind очередного скалярного поля и выдать его offset.
    fn scalar(&mut self, want: FieldKind) -> Result<usize, StoreError> {
        let f = self.field()?;
        if f.kind != want {
            return Err(self.mismatch(&want.to_string()));
        }
        let off = self.pos;
        self.pos += want.width();
        self.next += 1;
        Ok(off)
    }

    pub fn put_u8(&mut self, v: u8) -> Result<(), StoreError> {
        let off = self.scalar(FieldKind::U8)?;
        self.buf[off] = v;
        Ok(())
    }

    pub fn put_i8(&mut self, v: i8) -> Result<(), StoreError> {
        let off = self.scalar(FieldKind::I8)?;
        self.buf[off] = v as u8;
        Ok(())
    }

    pub fn put_u16(&mut self, v: u16) -> Result<(), StoreError> {
        let off = self.scalar(FieldKind::U16)?;
        LittleEndian::write_u16(&mut self.buf[off..off + 2], v);
        Ok(())
    }

    pub fn put_i16(&mut self, v: i16) -> Result<(), StoreError> {
        let off = self.scalar(FieldKind::I16)?;
        LittleEndian::write_i16(&mut self.buf[off..off + 2], v);
        Ok(())
    }

    pub fn put_u32(&mut self, v: u32) -> Result<(), StoreError> {
        let off = self.scalar(FieldKind::U32)?;
        LittleEndian::write_u32(&mut self.buf[off..off + 4], v);
        Ok(())
    }

    pub fn put_i32(&mut self, v: i32) -> Result<(), StoreError> {
        let off = self.scalar(FieldKind::I32)?;
        LittleEndian::write_i32(&mut self.buf[off..off + 4], v);
        Ok(())
    }

    pub fn put_u64(&mut self, v: u64) -> Result<(), StoreError> {
        let off = self.scalar(FieldKind::U64)?;
        LittleEndian::write_u64(&mut self.buf[off..off + 8], v);
        Ok(())
    }

    pub fn put_i64(&mut self, v: i64) -> Result<(), StoreError> {
        let off = self.scalar(FieldKind::I64)?;
        LittleEndian::write_i64(&mut self.buf[off..off + 8], v);
        Ok(())
    }

    pub fn put_f32(&mut self, v: f32) -> Result<(), StoreError> {
        let off = self.scalar(FieldKind::F32)?;
        LittleEndian::write_f32(&mut self.buf[off..off + 4], v);
        Ok(())
    }

    pub fn put_f64(&mut self, v: f64) -> Result<(), StoreError> {
        let off = self.scalar(FieldKind::F64)?;
        LittleEndian::write_f64(&mut self.buf[off..off + 8], v);
        Ok(())
    }

    pub fn put_bool(&mut self, v: bool) -> Result<(), StoreError> {
        let off = self.scalar(FieldKind::Bool)?;
        self.buf[off] = if v { 1 } else { 0 };
        Ok(())
    }

    /// UTF-8 строка в поле strN: не длиннее N байт, хвост — NUL.
    pub fn put_str(&mut self, s: &str) -> Result<(), StoreError> {
        let f = self.field()?;
        let n = match f.kind {
            FieldKind::Str(n) => n,
            _ => return Err(self.mismatch("str")),
        };
        let bytes = s.as_bytes();
        if bytes.len() > n {
            return Err(StoreError::Encode(format!(
                "field {} '{}': string {} B exceeds str{}",
                self.next,
                f.name,
                bytes.len(),
                n
            )));
        }
        let off = self.pos;
        self.buf[off..off + bytes.len()].copy_from_slice(bytes);
        // остаток уже нулевой после fill(0)
        self.pos += n;
        self.next += 1;
        Ok(())
    }

    /// Сырые байты в поле bytesN: ровно N байт.
    pub fn put_bytes(&mut self, b: &[u8]) -> Result<(), StoreError> {
        let f = self.field()?;
        let n = match f.kind {
            FieldKind::Bytes(n) => n,
            _ => return Err(self.mismatch("bytes")),
        };
        if b.len() != n {
            return Err(StoreError::Encode(format!(
                "field {} '{}': {} B given, bytes{} expected",
                self.next,
                f.name,
                b.len(),
                n
            )));
        }
        let off = self.pos;
        self.buf[off..off + n].copy_from_slice(b);
        self.pos += n;
        self.next += 1;
        Ok(())
    }

    /// Все поля должны быть записаны — иначе запись неполна.
    pub fn finish(self) -> Result<(), StoreError> {
        let total = self.layout.fields().len();
        if self.next != total {
            return Err(StoreError::Encode(format!(
                "record incomplete: {} of {} fields written",
                self.next, total
            )));
        }
        Ok(())
    }
}

/// Последовательный курсор чтения; зеркален RecordEncoder.
pub struct RecordDecoder<'a> {
    layout: &'a RecordLayout,
    buf: &'a [u8],
    pos: usize,
    next: usize,
}

impl<'a> RecordDecoder<'a> {
    pub(crate) fn new(layout: &'a RecordLayout, buf: &'a [u8]) -> Self {
        Self {
            layout,
            buf,
            pos: 0,
            next: 0,
        }
    }

    fn field(&self) -> Result<&Field, StoreError> {
        self.layout.fields().get(self.next).ok_or_else(|| {
            StoreError::Decode(format!(
                "record already consumed ({} fields)",
                self.layout.fields().len()
            ))
        })
    }

    fn mismatch(&self, asked: &str) -> StoreError {
        let f = &self.layout.fields()[self.next];
        StoreError::Decode(format!(
            "field {} '{}' is {}, not {}",
            self.next, f.name, f.kind, asked
        ))
    }

    fn scalar(&mut self, want: FieldKind) -> Result<usize, StoreError> {
        let f = self.field()?;
        if f.kind != want {
            return Err(self.mismatch(&want.to_string()));
        }
        let off = self.pos;
        self.pos += want.width();
        self.next += 1;
        Ok(off)
    }

    pub fn take_u8(&mut self) -> Result<u8, StoreError> {
        let off = self.scalar(FieldKind::U8)?;
        Ok(self.buf[off])
    }

    pub fn take_i8(&mut self) -> Result<i8, StoreError> {
        let off = self.scalar(FieldKind::I8)?;
        Ok(self.buf[off] as i8)
    }

    pub fn take_u16(&mut self) -> Result<u16, StoreError> {
        let off = self.scalar(FieldKind::U16)?;
        Ok(LittleEndian::read_u16(&self.buf[off..off + 2]))
    }

    pub fn take_i16(&mut self) -> Result<i16, StoreError> {
        let off = self.scalar(FieldKind::I16)?;
        Ok(LittleEndian::read_i16(&self.buf[off..off + 2]))
    }

    pub fn take_u32(&mut self) -> Result<u32, StoreError> {
        let off = self.scalar(FieldKind::U32)?;
        Ok(LittleEndian::read_u32(&self.buf[off..off + 4]))
    }

    pub fn take_i32(&mut self) -> Result<i32, StoreError> {
        let off = self.scalar(FieldKind::I32)?;
        Ok(LittleEndian::read_i32(&self.buf[off..off + 4]))
    }

    pub fn take_u64(&mut self) -> Result<u64, StoreError> {
        let off = self.scalar(FieldKind::U64)?;
        Ok(LittleEndian::read_u64(&self.buf[off..off + 8]))
    }

    pub fn take_i64(&mut self) -> Result<i64, StoreError> {
        let off = self.scalar(FieldKind::I64)?;
        Ok(LittleEndian::read_i64(&self.buf[off..off + 8]))
    }

    pub fn take_f32(&mut self) -> Result<f32, StoreError> {
        let off = self.scalar(FieldKind::F32)?;
        Ok(LittleEndian::read_f32(&self.buf[off..off + 4]))
    }

    pub fn take_f64(&mut self) -> Result<f64, StoreError> {
        let off = self.scalar(FieldKind::F64)?;
        Ok(LittleEndian::read_f64(&self.buf[off..off + 8]))
    }

    /// Строго 0/1: прочие байты — признак чужой формы или мусора.
    pub fn take_bool(&mut self) -> Result<bool, StoreError> {
        let f = self.field()?;
        if f.kind != FieldKind::Bool {
            return Err(self.mismatch("bool"));
        }
        let name = f.name.clone();
        let idx = self.next;
        let off = self.pos;
        self.pos += 1;
        self.next += 1;
        match self.buf[off] {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(StoreError::Decode(format!(
                "field {} '{}': bool byte 0x{:02x}",
                idx, name, b
            ))),
        }
    }

    /// Поле strN: хвостовые NUL отрезаются, невалидный UTF-8 — ошибка.
    pub fn take_str(&mut self) -> Result<String, StoreError> {
        let f = self.field()?;
        let n = match f.kind {
            FieldKind::Str(n) => n,
            _ => return Err(self.mismatch("str")),
        };
        let name = f.name.clone();
        let idx = self.next;
        let off = self.pos;
        self.pos += n;
        self.next += 1;

        let raw = &self.buf[off..off + n];
        let end = raw.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
        match std::str::from_utf8(&raw[..end]) {
            Ok(s) => Ok(s.to_string()),
            Err(e) => Err(StoreError::Decode(format!(
                "field {} '{}': invalid UTF-8: {}",
                idx, name, e
            ))),
        }
    }

    pub fn take_bytes(&mut self) -> Result<Vec<u8>, StoreError> {
        let f = self.field()?;
        let n = match f.kind {
            FieldKind::Bytes(n) => n,
            _ => return Err(self.mismatch("bytes")),
        };
        let off = self.pos;
        self.pos += n;
        self.next += 1;
        Ok(self.buf[off..off + n].to_vec())
    }

    /// Все поля должны быть прочитаны.
    pub fn finish(self) -> Result<(), StoreError> {
        let total = self.layout.fields().len();
        if self.next != total {
            return Err(StoreError::Decode(format!(
                "record not fully consumed: {} of {} fields read",
                self.next, total
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::layout::{FieldKind, RecordLayout};

    #[derive(Debug, Clone, PartialEq)]
    struct Sensor {
        id: u32,
        name: String,
        value: f64,
        online: bool,
    }

    impl RecordCodec for Sensor {
        fn layout() -> RecordLayout {
            RecordLayout::new()
                .with("id", FieldKind::U32)
                .with("name", FieldKind::Str(8))
                .with("value", FieldKind::F64)
                .with("online", FieldKind::Bool)
        }

        fn encode(&self, enc: &mut RecordEncoder<'_>) -> Result<(), StoreError> {
            enc.put_u32(self.id)?;
            enc.put_str(&self.name)?;
            enc.put_f64(self.value)?;
            enc.put_bool(self.online)
        }

        fn decode(dec: &mut RecordDecoder<'_>) -> Result<Self, StoreError> {
            Ok(Self {
                id: dec.take_u32()?,
                name: dec.take_str()?,
                value: dec.take_f64()?,
                online: dec.take_bool()?,
            })
        }
    }

    #[test]
    fn roundtrip() {
        let layout = Sensor::layout();
        let rec = Sensor {
            id: 42,
            name: "probe".into(),
            value: -3.5,
            online: true,
        };
        let mut buf = vec![0xAAu8; layout.record_len()];
        encode_record(&layout, &rec, &mut buf).unwrap();
        let back: Sensor = decode_record(&layout, &buf).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn kind_mismatch_fails_at_first_field() {
        let layout = Sensor::layout();
        let mut buf = vec![0u8; layout.record_len()];
        let mut enc = RecordEncoder::new(&layout, &mut buf);
        let err = enc.put_u64(1).unwrap_err();
        match err {
            StoreError::Encode(msg) => assert!(msg.contains("'id'"), "{}", msg),
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn overlong_string_rejected() {
        let layout = Sensor::layout();
        let rec = Sensor {
            id: 1,
            name: "way-too-long-name".into(),
            value: 0.0,
            online: false,
        };
        let mut buf = vec![0u8; layout.record_len()];
        assert!(matches!(
            encode_record(&layout, &rec, &mut buf),
            Err(StoreError::Encode(_))
        ));
    }

    #[test]
    fn incomplete_record_rejected() {
        let layout = Sensor::layout();
        let mut buf = vec![0u8; layout.record_len()];
        let mut enc = RecordEncoder::new(&layout, &mut buf);
        enc.put_u32(7).unwrap();
        assert!(matches!(enc.finish(), Err(StoreError::Encode(_))));
    }

    #[test]
    fn invalid_utf8_rejected() {
        let layout = Sensor::layout();
        let rec = Sensor {
            id: 9,
            name: "ok".into(),
            value: 1.0,
            online: false,
        };
        let mut buf = vec![0u8; layout.record_len()];
        encode_record(&layout, &rec, &mut buf).unwrap();
        buf[4] = 0xFF;
        buf[5] = 0xFE; // порча поля name
        assert!(matches!(
            decode_record::<Sensor>(&layout, &buf),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn bool_byte_strict() {
        let layout = Sensor::layout();
        let rec = Sensor {
            id: 9,
            name: "ok".into(),
            value: 1.0,
            online: true,
        };
        let mut buf = vec![0u8; layout.record_len()];
        encode_record(&layout, &rec, &mut buf).unwrap();
        let last = buf.len() - 1;
        buf[last] = 7;
        assert!(matches!(
            decode_record::<Sensor>(&layout, &buf),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn blank_slot_bytes_decode_as_zero_record() {
        // нулевые байты — валидная "нулевая" запись для этой формы
        let layout = Sensor::layout();
        let buf = vec![0u8; layout.record_len()];
        let rec: Sensor = decode_record(&layout, &buf).unwrap();
        assert_eq!(rec.id, 0);
        assert_eq!(rec.name, "");
        assert_eq!(rec.value, 0.0);
        assert!(!rec.online);
    }
}
