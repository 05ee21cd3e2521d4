use std::io;

/// Ошибки библиотеки. Лояльные случаи (read/write на закрытом store)
/// ошибками не являются и возвращаются как Ok(None) — см. store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Open/seek/read/write/close failures at the OS level.
    #[error("io: {0}")]
    Io(#[from] io::Error),

    /// Invalid record layout (empty, zero-width field).
    #[error("layout: {0}")]
    Layout(String),

    /// The record cannot be turned into bytes (kind mismatch, oversize
    /// string, wrong raw length, missing fields).
    #[error("encode: {0}")]
    Encode(String),

    /// The bytes cannot be turned into the expected record shape
    /// (kind mismatch, invalid UTF-8, shape mismatch across reopen).
    #[error("decode: {0}")]
    Decode(String),

    /// Read of a slot at or past the end of the file.
    #[error("slot {index} out of range (slots={slots})")]
    OutOfRange { index: u64, slots: u64 },
}

/// Ошибки текстового модуля. Отдельный enum: store и textfile —
/// независимые механизмы и не делят ни состояние, ни ошибки.
#[derive(thiserror::Error, Debug)]
pub enum TextFileError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    /// Чтение строки без open_to_read(). Жёсткая ошибка, в отличие от
    /// лояльного no-op при записи в неоткрытый файл.
    #[error("{path}: not open for reading")]
    NotOpenForReading { path: String },
}
