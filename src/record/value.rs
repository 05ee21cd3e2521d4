//! Dynamic rows: one Value per field of a layout.
//!
//! This is the untyped path used by the CLI and tooling, where the
//! record shape arrives as a `--layout` string at runtime and no
//! RecordCodec impl exists. The same encoder/decoder cursors are used
//! underneath, so the layout discipline is identical.

use std::fmt;

use crate::error::StoreError;
use crate::record::codec::{RecordDecoder, RecordEncoder};
use crate::record::layout::{FieldKind, RecordLayout};
use crate::util::decode_hex;

/// Одно значение поля динамической строки.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    Str(String),
}

impl Value {
    /// Parse a CLI-supplied string into a value of the given kind.
    /// Bytes fields take hex ("deadbeef"), bool takes the usual
    /// 1|0|true|false|yes|no|on|off forms.
    pub fn parse(kind: &FieldKind, s: &str) -> Result<Value, StoreError> {
        let s = s.trim();
        let bad = |what: &str| StoreError::Encode(format!("cannot parse '{}' as {}", s, what));
        let v = match kind {
            FieldKind::U8 => Value::U8(s.parse().map_err(|_| bad("u8"))?),
            FieldKind::I8 => Value::I8(s.parse().map_err(|_| bad("i8"))?),
            FieldKind::U16 => Value::U16(s.parse().map_err(|_| bad("u16"))?),
            FieldKind::I16 => Value::I16(s.parse().map_err(|_| bad("i16"))?),
            FieldKind::U32 => Value::U32(s.parse().map_err(|_| bad("u32"))?),
            FieldKind::I32 => Value::I32(s.parse().map_err(|_| bad("i32"))?),
            FieldKind::U64 => Value::U64(s.parse().map_err(|_| bad("u64"))?),
            FieldKind::I64 => Value::I64(s.parse().map_err(|_| bad("i64"))?),
            FieldKind::F32 => Value::F32(s.parse().map_err(|_| bad("f32"))?),
            FieldKind::F64 => Value::F64(s.parse().map_err(|_| bad("f64"))?),
            FieldKind::Bool => {
                let t = s.to_ascii_lowercase();
                match t.as_str() {
                    "1" | "true" | "yes" | "on" => Value::Bool(true),
                    "0" | "false" | "no" | "off" => Value::Bool(false),
                    _ => return Err(bad("bool")),
                }
            }
            FieldKind::Bytes(_) => {
                Value::Bytes(decode_hex(s).map_err(|e| StoreError::Encode(e.to_string()))?)
            }
            FieldKind::Str(_) => Value::Str(s.to_string()),
        };
        Ok(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(v) => write!(f, "{}", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "{}", crate::util::to_hex(v)),
            Value::Str(v) => write!(f, "{}", v),
        }
    }
}

/// Закодировать динамическую строку в буфер ровно record_len байт.
pub fn encode_row(
    layout: &RecordLayout,
    values: &[Value],
    buf: &mut [u8],
) -> Result<(), StoreError> {
    if values.len() != layout.fields().len() {
        return Err(StoreError::Encode(format!(
            "{} values given, layout has {} fields",
            values.len(),
            layout.fields().len()
        )));
    }
    if buf.len() != layout.record_len() {
        return Err(StoreError::Encode(format!(
            "buffer {} B != record_len {} B",
            buf.len(),
            layout.record_len()
        )));
    }
    let mut enc = RecordEncoder::new(layout, buf);
    for v in values {
        match v {
            Value::U8(x) => enc.put_u8(*x)?,
            Value::I8(x) => enc.put_i8(*x)?,
            Value::U16(x) => enc.put_u16(*x)?,
            Value::I16(x) => enc.put_i16(*x)?,
            Value::U32(x) => enc.put_u32(*x)?,
            Value::I32(x) => enc.put_i32(*x)?,
            Value::U64(x) => enc.put_u64(*x)?,
            Value::I64(x) => enc.put_i64(*x)?,
            Value::F32(x) => enc.put_f32(*x)?,
            Value::F64(x) => enc.put_f64(*x)?,
            Value::Bool(x) => enc.put_bool(*x)?,
            Value::Bytes(x) => enc.put_bytes(x)?,
            Value::Str(x) => enc.put_str(x)?,
        }
    }
    enc.finish()
}

/// Раскодировать слот в динамическую строку по раскладке.
pub fn decode_row(layout: &RecordLayout, buf: &[u8]) -> Result<Vec<Value>, StoreError> {
    if buf.len() != layout.record_len() {
        return Err(StoreError::Decode(format!(
            "buffer {} B != record_len {} B",
            buf.len(),
            layout.record_len()
        )));
    }
    let mut dec = RecordDecoder::new(layout, buf);
    let mut out = Vec::with_capacity(layout.fields().len());
    for f in layout.fields() {
        let v = match f.kind {
            FieldKind::U8 => Value::U8(dec.take_u8()?),
            FieldKind::I8 => Value::I8(dec.take_i8()?),
            FieldKind::U16 => Value::U16(dec.take_u16()?),
            FieldKind::I16 => Value::I16(dec.take_i16()?),
            FieldKind::U32 => Value::U32(dec.take_u32()?),
            FieldKind::I32 => Value::I32(dec.take_i32()?),
            FieldKind::U64 => Value::U64(dec.take_u64()?),
            FieldKind::I64 => Value::I64(dec.take_i64()?),
            FieldKind::F32 => Value::F32(dec.take_f32()?),
            FieldKind::F64 => Value::F64(dec.take_f64()?),
            FieldKind::Bool => Value::Bool(dec.take_bool()?),
            FieldKind::Bytes(_) => Value::Bytes(dec.take_bytes()?),
            FieldKind::Str(_) => Value::Str(dec.take_str()?),
        };
        out.push(v);
    }
    dec.finish()?;
    Ok(out)
}
