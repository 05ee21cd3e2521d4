//! record — формат записи фиксированной длины.
//!
//! - layout: раскладка (именованные поля фиксированной ширины); длина
//!   записи — чистая функция от раскладки.
//! - codec: курсоры RecordEncoder/RecordDecoder поверх буфера слота и
//!   трейт RecordCodec для типизированных записей.
//! - value: динамические строки (Vec<Value>) для CLI и инструментов.

mod codec;
mod layout;
mod value;

pub use codec::{decode_record, encode_record, RecordCodec, RecordDecoder, RecordEncoder};
pub use layout::{Field, FieldKind, RecordLayout};
pub use value::{decode_row, encode_row, Value};
