//! store/io — позиционный ввод/вывод слотов:
//! - read_slot/write_slot: сырые байты слота (путь CLI и диагностики)
//! - read_record/write_record/append_record: типизированные записи
//!
//! Контракт закрытого store лояльный: чтение и запись возвращают
//! Ok(None) без какого-либо ввода/вывода. Битые данные и ошибки ОС —
//! жёсткие ошибки, как и чтение слота за концом файла (никогда не
//! возвращаем "молча не ту запись").

use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::StoreError;
use crate::record::{decode_record, encode_record, RecordCodec};

use super::core::RecordStore;

/// Куда писать запись.
#[derive(Clone, Copy, Debug)]
pub enum WritePos {
    /// В слот с данным индексом; запись за текущим концом файла
    /// растит файл, промежуточные blank-слоты создаются неявно и их
    /// содержимое не гарантируется.
    At(u64),
    /// В слот len() — канонический способ дорастить store на один
    /// слот (замена сигнальному отрицательному индексу источника).
    Append,
}

impl RecordStore {
    /// Прочитать сырые байты слота. Closed → Ok(None).
    pub fn read_slot(&mut self, index: u64) -> Result<Option<Vec<u8>>, StoreError> {
        if !self.read_slot_scratch(index)? {
            return Ok(None);
        }
        Ok(Some(self.scratch.clone()))
    }

    /// Прочитать типизированную запись. Closed → Ok(None).
    /// Форма R сверяется с раскладкой store — запись другой формы той
    /// же длины отвергается, а не декодируется молча.
    pub fn read_record<R: RecordCodec>(&mut self, index: u64) -> Result<Option<R>, StoreError> {
        let shape = R::layout();
        if !shape.same_shape(self.layout()) {
            return Err(StoreError::Decode(format!(
                "record shape [{}] does not match store layout [{}]",
                shape,
                self.layout()
            )));
        }
        if !self.read_slot_scratch(index)? {
            return Ok(None);
        }
        let rec = decode_record::<R>(self.layout(), &self.scratch)?;
        Ok(Some(rec))
    }

    /// Общий путь чтения: guard диапазона, seek, read_exact в scratch.
    /// false — store закрыт, чтение не выполнялось.
    fn read_slot_scratch(&mut self, index: u64) -> Result<bool, StoreError> {
        if self.file.is_none() {
            return Ok(false);
        }
        let slots = self.len()?;
        if index >= slots {
            return Err(StoreError::OutOfRange { index, slots });
        }
        let off = self.slot_offset(index);
        let f = match self.file.as_mut() {
            Some(f) => f,
            None => return Ok(false),
        };
        f.seek(SeekFrom::Start(off))?;
        f.read_exact(&mut self.scratch)?;
        Ok(true)
    }

    /// Записать сырые байты слота (ровно record_len). Closed → Ok(None),
    /// иначе Ok(Some(index)) — индекс записанного слота.
    pub fn write_slot(&mut self, bytes: &[u8], pos: WritePos) -> Result<Option<u64>, StoreError> {
        if bytes.len() != self.record_len() {
            return Err(StoreError::Encode(format!(
                "slot buffer {} B != record_len {} B",
                bytes.len(),
                self.record_len()
            )));
        }
        if self.file.is_none() {
            return Ok(None);
        }
        let index = self.resolve_pos(pos)?;
        let off = self.slot_offset(index);
        let do_fsync = self.data_fsync();
        let f = match self.file.as_mut() {
            Some(f) => f,
            None => return Ok(None),
        };
        f.seek(SeekFrom::Start(off))?;
        f.write_all(bytes)?;
        if do_fsync {
            f.sync_all()?;
        }
        Ok(Some(index))
    }

    /// Записать типизированную запись. Closed → Ok(None): ничего не
    /// кодируется и ни один байт не пишется. Сначала кодирование в
    /// scratch (ошибка Encode случается до любого ввода/вывода), потом
    /// seek + write_all.
    pub fn write_record<R: RecordCodec>(
        &mut self,
        rec: &R,
        pos: WritePos,
    ) -> Result<Option<u64>, StoreError> {
        let shape = R::layout();
        if !shape.same_shape(self.layout()) {
            return Err(StoreError::Encode(format!(
                "record shape [{}] does not match store layout [{}]",
                shape,
                self.layout()
            )));
        }
        if self.file.is_none() {
            return Ok(None);
        }

        let mut scratch = std::mem::take(&mut self.scratch);
        let res = encode_record(self.layout(), rec, &mut scratch);
        self.scratch = scratch;
        res?;

        let index = self.resolve_pos(pos)?;
        let off = self.slot_offset(index);
        let do_fsync = self.data_fsync();
        let f = match self.file.as_mut() {
            Some(f) => f,
            None => return Ok(None),
        };
        f.seek(SeekFrom::Start(off))?;
        f.write_all(&self.scratch)?;
        if do_fsync {
            f.sync_all()?;
        }
        Ok(Some(index))
    }

    /// Дописать запись в конец (слот len()).
    pub fn append_record<R: RecordCodec>(&mut self, rec: &R) -> Result<Option<u64>, StoreError> {
        self.write_record(rec, WritePos::Append)
    }

    /// Append идёт в слот len(): выровнено по границе слота, даже если
    /// в файле остался неполный хвост (состояние вне контракта —
    /// перезаписывается, а не продлевается со сдвигом).
    fn resolve_pos(&self, pos: WritePos) -> Result<u64, StoreError> {
        match pos {
            WritePos::At(i) => Ok(i),
            WritePos::Append => self.len(),
        }
    }
}
