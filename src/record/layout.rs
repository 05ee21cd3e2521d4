//! Record layout: the construction-time shape of a record.
//!
//! A layout is an ordered list of named fixed-width fields. The encoded
//! length of every record sharing a layout is the sum of the field
//! widths — a structural property of the shape, not a convention the
//! caller has to maintain. The store derives its slot size from here.
//!
//! Text form (CLI contract, supplied identically by every reader and
//! writer of a file): `"id:u32,name:str16,score:f64"`.

use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// Kind (and thereby width) of a single record field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    Bool,
    /// Raw bytes of exactly this width.
    Bytes(usize),
    /// UTF-8 text, NUL-padded to this width.
    Str(usize),
}

impl FieldKind {
    /// Encoded width in bytes. Fixed per kind; this is what makes the
    /// record length structural.
    pub fn width(&self) -> usize {
        match self {
            FieldKind::U8 | FieldKind::I8 | FieldKind::Bool => 1,
            FieldKind::U16 | FieldKind::I16 => 2,
            FieldKind::U32 | FieldKind::I32 | FieldKind::F32 => 4,
            FieldKind::U64 | FieldKind::I64 | FieldKind::F64 => 8,
            FieldKind::Bytes(n) | FieldKind::Str(n) => *n,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::U8 => write!(f, "u8"),
            FieldKind::I8 => write!(f, "i8"),
            FieldKind::U16 => write!(f, "u16"),
            FieldKind::I16 => write!(f, "i16"),
            FieldKind::U32 => write!(f, "u32"),
            FieldKind::I32 => write!(f, "i32"),
            FieldKind::U64 => write!(f, "u64"),
            FieldKind::I64 => write!(f, "i64"),
            FieldKind::F32 => write!(f, "f32"),
            FieldKind::F64 => write!(f, "f64"),
            FieldKind::Bool => write!(f, "bool"),
            FieldKind::Bytes(n) => write!(f, "bytes{}", n),
            FieldKind::Str(n) => write!(f, "str{}", n),
        }
    }
}

impl FromStr for FieldKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, StoreError> {
        let s = s.trim();
        let kind = match s {
            "u8" => FieldKind::U8,
            "i8" => FieldKind::I8,
            "u16" => FieldKind::U16,
            "i16" => FieldKind::I16,
            "u32" => FieldKind::U32,
            "i32" => FieldKind::I32,
            "u64" => FieldKind::U64,
            "i64" => FieldKind::I64,
            "f32" => FieldKind::F32,
            "f64" => FieldKind::F64,
            "bool" => FieldKind::Bool,
            _ => {
                if let Some(n) = s.strip_prefix("bytes") {
                    let n: usize = n
                        .parse()
                        .map_err(|_| StoreError::Layout(format!("bad field kind '{}'", s)))?;
                    FieldKind::Bytes(n)
                } else if let Some(n) = s.strip_prefix("str") {
                    let n: usize = n
                        .parse()
                        .map_err(|_| StoreError::Layout(format!("bad field kind '{}'", s)))?;
                    FieldKind::Str(n)
                } else {
                    return Err(StoreError::Layout(format!("bad field kind '{}'", s)));
                }
            }
        };
        Ok(kind)
    }
}

/// One named field of a layout. Имя — документация и удобство CLI;
/// форма записи на диске определяется только kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

/// Ordered, fixed-width record shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordLayout {
    fields: Vec<Field>,
}

impl RecordLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: append a field and return the layout.
    pub fn with<S: Into<String>>(mut self, name: S, kind: FieldKind) -> Self {
        self.push(name, kind);
        self
    }

    pub fn push<S: Into<String>>(&mut self, name: S, kind: FieldKind) {
        self.fields.push(Field {
            name: name.into(),
            kind,
        });
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Encoded record length in bytes: a pure function of the shape.
    /// Two equal layouts always measure equal — no sample instance is
    /// ever serialized to find out.
    pub fn record_len(&self) -> usize {
        self.fields.iter().map(|f| f.kind.width()).sum()
    }

    /// Проверка раскладки перед использованием в store:
    /// непустая, без полей нулевой ширины, разумная длина записи.
    pub fn validate(&self) -> Result<(), StoreError> {
        const MAX_RECORD_LEN: usize = 16 * 1024 * 1024; // 16 MiB

        if self.fields.is_empty() {
            return Err(StoreError::Layout("layout has no fields".into()));
        }
        for (i, f) in self.fields.iter().enumerate() {
            if f.kind.width() == 0 {
                return Err(StoreError::Layout(format!(
                    "field {} '{}' has zero width ({})",
                    i, f.name, f.kind
                )));
            }
        }
        let len = self.record_len();
        if len > MAX_RECORD_LEN {
            return Err(StoreError::Layout(format!(
                "record_len {} exceeds max {}",
                len, MAX_RECORD_LEN
            )));
        }
        Ok(())
    }

    /// Совпадение форм: поэлементное равенство kind'ов. Имена полей не
    /// участвуют — они не являются частью формата на диске.
    pub fn same_shape(&self, other: &RecordLayout) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(other.fields.iter())
                .all(|(a, b)| a.kind == b.kind)
    }
}

impl fmt::Display for RecordLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}:{}", field.name, field.kind)?;
        }
        Ok(())
    }
}

impl FromStr for RecordLayout {
    type Err = StoreError;

    /// Parse the compact text form: `name:kind` pairs joined by commas.
    fn from_str(s: &str) -> Result<Self, StoreError> {
        let mut layout = RecordLayout::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (name, kind) = part
                .split_once(':')
                .ok_or_else(|| StoreError::Layout(format!("bad field spec '{}'", part)))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(StoreError::Layout(format!("bad field spec '{}'", part)));
            }
            layout.push(name, kind.parse::<FieldKind>()?);
        }
        layout.validate()?;
        Ok(layout)
    }
}
