//! store — слот-хранилище фиксированной длины поверх одного плоского
//! файла. Разбивка модуля:
//! - core.rs — структура RecordStore, open()/close(), длины.
//! - io.rs   — позиционные чтение/запись слотов и типизированных записей.

pub mod core;
pub mod io;

// Re-exports для внешнего API
pub use self::core::RecordStore;
pub use self::io::WritePos;
