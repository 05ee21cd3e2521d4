use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use SlotDB::record::{FieldKind, RecordCodec, RecordDecoder, RecordEncoder, RecordLayout};
use SlotDB::store::{RecordStore, WritePos};
use SlotDB::StoreError;

#[derive(Debug, Clone, PartialEq)]
struct Counter {
    n: u64,
}

impl RecordCodec for Counter {
    fn layout() -> RecordLayout {
        RecordLayout::new().with("n", FieldKind::U64)
    }

    fn encode(&self, enc: &mut RecordEncoder<'_>) -> Result<(), StoreError> {
        enc.put_u64(self.n)
    }

    fn decode(dec: &mut RecordDecoder<'_>) -> Result<Self, StoreError> {
        Ok(Self { n: dec.take_u64()? })
    }
}

#[test]
fn closed_store_reads_and_writes_are_noops() -> Result<()> {
    let path = unique_path("closed-noop");
    let mut store = RecordStore::new(&path, Counter::layout())?;

    // запись одного слота, чтобы файл существовал и было что портить
    store.open()?;
    store.append_record(&Counter { n: 42 })?;
    store.close()?;
    let before = fs::read(&path)?;

    // закрытый store: чтение и запись — Ok(None), без ввода/вывода
    assert!(store.read_record::<Counter>(0)?.is_none());
    assert!(store.read_slot(0)?.is_none());
    assert!(store
        .write_record(&Counter { n: 7 }, WritePos::At(0))?
        .is_none());
    assert!(store.append_record(&Counter { n: 7 })?.is_none());

    // файл не изменился ни на байт
    let after = fs::read(&path)?;
    assert_eq!(before, after);
    assert_eq!(store.len()?, 1);
    Ok(())
}

#[test]
fn double_close_is_silent_and_stays_closed() -> Result<()> {
    let path = unique_path("double-close");
    let mut store = RecordStore::new(&path, Counter::layout())?;
    store.open()?;
    assert!(store.is_open());

    store.close()?;
    assert!(!store.is_open());
    store.close()?; // повторное закрытие — no-op
    assert!(!store.is_open());
    Ok(())
}

#[test]
fn open_is_idempotent() -> Result<()> {
    let path = unique_path("reopen");
    let mut store = RecordStore::new(&path, Counter::layout())?;
    store.open()?;
    store.open()?; // no-op
    store.append_record(&Counter { n: 1 })?;
    store.close()?;

    // повторное открытие видит данные
    store.open()?;
    let got: Counter = store.read_record(0)?.expect("open");
    assert_eq!(got.n, 1);
    store.close()?;
    Ok(())
}

#[test]
fn len_works_in_any_state() -> Result<()> {
    let path = unique_path("len-closed");
    let mut store = RecordStore::new(&path, Counter::layout())?;
    assert_eq!(store.len()?, 0); // файла ещё нет

    store.open()?;
    for n in 0..4 {
        store.append_record(&Counter { n })?;
    }
    store.close()?;

    // len() по метаданным — store закрыт
    assert_eq!(store.len()?, 4);
    Ok(())
}

fn unique_path(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("slotdb-{}-{}-{}.slot", prefix, pid, t))
}
