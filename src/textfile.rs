//! textfile — последовательный построчный текстовый файл.
//!
//! Независим от слот-хранилища: текст/строки против бинарных слотов по
//! смещению, никакого общего состояния. Общие только конвенции
//! lifecycle: три режима (Closed/Reading/Writing), открытие —
//! no-op вне Closed, запись в неоткрытый файл — лояльный no-op,
//! а вот чтение без open_to_read() — жёсткая ошибка.
//!
//! Запись буферизована (BufWriter), чтение — BufReader. Конец файла —
//! Ok(None) из read_line(), отдельного eof() нет.

use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::mem;
use std::path::{Path, PathBuf};

use crate::error::TextFileError;

/// Наблюдаемый статус файла.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileStatus {
    Closed,
    Reading,
    Writing,
}

enum Mode {
    Closed,
    Reading(BufReader<File>),
    Writing(BufWriter<File>),
}

/// Обёртка над текстовым файлом с построчным доступом.
pub struct TextFile {
    path: PathBuf,
    mode: Mode,
}

impl TextFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            mode: Mode::Closed,
        }
    }

    /// Открыть только для чтения. No-op, если файл уже открыт (в любом
    /// режиме). Отсутствующий файл — ошибка Io (NotFound).
    pub fn open_to_read(&mut self) -> Result<(), TextFileError> {
        if let Mode::Closed = self.mode {
            let f = File::open(&self.path)?;
            debug!("open_to_read {}", self.path.display());
            self.mode = Mode::Reading(BufReader::new(f));
        }
        Ok(())
    }

    /// Открыть для записи. No-op вне Closed. append=true дописывает в
    /// конец, append=false пересоздаёт файл пустым.
    pub fn open_to_write(&mut self, append: bool) -> Result<(), TextFileError> {
        if let Mode::Closed = self.mode {
            let mut opts = OpenOptions::new();
            opts.create(true).write(true);
            if append {
                opts.append(true);
            } else {
                opts.truncate(true);
            }
            let f = opts.open(&self.path)?;
            debug!("open_to_write {} (append={})", self.path.display(), append);
            self.mode = Mode::Writing(BufWriter::new(f));
        }
        Ok(())
    }

    /// Записать одну строку (перевод строки добавляется). Если файл не
    /// открыт для записи — лояльный no-op: Ok(false), ни одного байта
    /// не записано.
    pub fn write_line(&mut self, line: &str) -> Result<bool, TextFileError> {
        match &mut self.mode {
            Mode::Writing(w) => {
                writeln!(w, "{}", line)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Прочитать очередную строку (без завершающего перевода строки).
    /// Ok(None) — конец файла. Чтение без open_to_read() — ошибка.
    pub fn read_line(&mut self) -> Result<Option<String>, TextFileError> {
        let r = match &mut self.mode {
            Mode::Reading(r) => r,
            _ => {
                return Err(TextFileError::NotOpenForReading {
                    path: self.path.display().to_string(),
                })
            }
        };
        let mut line = String::new();
        let n = r.read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    /// Сбросить буфер записи. No-op вне Writing.
    pub fn flush(&mut self) -> Result<(), TextFileError> {
        if let Mode::Writing(w) = &mut self.mode {
            w.flush()?;
        }
        Ok(())
    }

    /// Закрыть файл (в любом режиме; повторный вызов — no-op).
    /// Статус становится Closed даже при ошибке финального flush.
    pub fn close(&mut self) -> Result<(), TextFileError> {
        match mem::replace(&mut self.mode, Mode::Closed) {
            Mode::Writing(mut w) => {
                debug!("close {}", self.path.display());
                w.flush()?;
                Ok(())
            }
            Mode::Reading(_) => {
                debug!("close {}", self.path.display());
                Ok(())
            }
            Mode::Closed => Ok(()),
        }
    }

    pub fn status(&self) -> FileStatus {
        match self.mode {
            Mode::Closed => FileStatus::Closed,
            Mode::Reading(_) => FileStatus::Reading,
            Mode::Writing(_) => FileStatus::Writing,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
