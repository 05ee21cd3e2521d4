#![allow(non_snake_case)]

// Базовые модули
pub mod config;
pub mod error;
pub mod util;

// Формат записи: раскладка, кодек, динамические строки
pub mod record; // src/record/{mod,layout,codec,value}.rs

// Хранилище слотов фиксированной длины
pub mod store; // src/store/{mod,core,io}.rs

// Последовательный текстовый файл (независимый от store)
pub mod textfile;

// CLI (бинарь slotdb)
pub mod cli;

// Удобные реэкспорты
pub use config::StoreConfig;
pub use error::{StoreError, TextFileError};
pub use record::{
    decode_record, decode_row, encode_record, encode_row, Field, FieldKind, RecordCodec,
    RecordDecoder, RecordEncoder, RecordLayout, Value,
};
pub use store::{RecordStore, WritePos};
pub use textfile::{FileStatus, TextFile};
