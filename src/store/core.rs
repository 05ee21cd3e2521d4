//! store/core — ядро RecordStore: структура, lifecycle, длины.
//!
//! Состояние Closed/Open — это Option<File>: пока store открыт, он
//! эксклюзивно владеет дескриптором. Scratch-буфер ровно record_len
//! байт переиспользуется всеми операциями ввода/вывода.

use log::debug;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::record::RecordLayout;

/// Слот-хранилище: N записей фиксированной длины по смещению
/// `index * record_len` в одном файле. Без заголовка, без магии,
/// без метаданных слотов — формат файла целиком задаётся раскладкой.
pub struct RecordStore {
    path: PathBuf,
    layout: RecordLayout,
    record_len: usize,
    cfg: StoreConfig,
    pub(crate) file: Option<std::fs::File>,
    pub(crate) scratch: Vec<u8>,
}

impl RecordStore {
    /// Создать store (в состоянии Closed) по пути и раскладке.
    /// Длина записи выводится из раскладки — никакой пробной
    /// сериализации образца.
    pub fn new<P: Into<PathBuf>>(path: P, layout: RecordLayout) -> Result<Self, StoreError> {
        Self::with_config(path, layout, StoreConfig::default())
    }

    pub fn with_config<P: Into<PathBuf>>(
        path: P,
        layout: RecordLayout,
        cfg: StoreConfig,
    ) -> Result<Self, StoreError> {
        layout.validate()?;
        let record_len = layout.record_len();
        Ok(Self {
            path: path.into(),
            layout,
            record_len,
            cfg,
            file: None,
            scratch: vec![0u8; record_len],
        })
    }

    /// Открыть файл на чтение/запись (создать, если отсутствует и
    /// cfg.create). No-op, если уже открыт.
    pub fn open(&mut self) -> Result<(), StoreError> {
        if self.file.is_some() {
            return Ok(());
        }
        let mut opts = OpenOptions::new();
        opts.read(true).write(true);
        if self.cfg.create {
            opts.create(true);
        }
        let f = opts.open(&self.path)?;
        debug!(
            "open {} (record_len={})",
            self.path.display(),
            self.record_len
        );
        self.file = Some(f);
        Ok(())
    }

    /// Закрыть store. No-op, если уже закрыт. Состояние становится
    /// Closed даже если финальный fsync вернул ошибку — дескриптор
    /// в любом случае освобождён.
    pub fn close(&mut self) -> Result<(), StoreError> {
        if let Some(f) = self.file.take() {
            debug!("close {}", self.path.display());
            f.sync_all()?;
        }
        Ok(())
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Число целых слотов в файле (включая blank-слоты, в которые
    /// никто не писал). Смотрит метаданные файловой системы, поэтому
    /// работает в любом состоянии; отсутствующий файл — 0 слотов.
    pub fn len(&self) -> Result<u64, StoreError> {
        match fs::metadata(&self.path) {
            Ok(m) => Ok(m.len() / self.record_len as u64),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    #[inline]
    pub fn record_len(&self) -> usize {
        self.record_len
    }

    #[inline]
    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub(crate) fn data_fsync(&self) -> bool {
        self.cfg.data_fsync
    }

    /// Смещение слота в байтах.
    #[inline]
    pub(crate) fn slot_offset(&self, index: u64) -> u64 {
        index * self.record_len as u64
    }
}

impl Drop for RecordStore {
    fn drop(&mut self) {
        // Страховка от утечки дескриптора на ранних return'ах.
        // Ошибки fsync здесь игнорируются; проверяемый путь — close().
        if let Some(f) = self.file.take() {
            let _ = f.sync_all();
        }
    }
}
