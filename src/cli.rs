use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::record::{decode_row, encode_row, Value};
use crate::store::{RecordStore, WritePos};
use crate::util::{display_text, hex_dump};
use crate::RecordLayout;

#[derive(Parser, Debug)]
#[command(
    name = "slotdb",
    version,
    about = "Fixed-length record store over a single flat file",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

// У файла нет заголовка, поэтому раскладка — внешний контракт:
// --layout обязан совпадать у всех читателей и писателей файла.
#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Создать пустой файл хранилища
    Init {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        layout: String,
    },
    /// Размеры файла и раскладки
    Status {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        layout: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Записать запись в слот с данным индексом
    Put {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        layout: String,
        #[arg(long)]
        index: u64,
        /// Значения полей по порядку раскладки (bytes — hex)
        values: Vec<String>,
    },
    /// Дописать запись в конец
    Append {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        layout: String,
        values: Vec<String>,
    },
    /// Прочитать слот с данным индексом
    Get {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        layout: String,
        #[arg(long)]
        index: u64,
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Дополнительно напечатать hex-дамп слота
        #[arg(long, default_value_t = false)]
        raw: bool,
    },
    /// Прочитать все слоты по порядку
    Scan {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        layout: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Init { path, layout } => cmd_init(path, &layout),
        Cmd::Status { path, layout, json } => cmd_status(path, &layout, json),
        Cmd::Put {
            path,
            layout,
            index,
            values,
        } => cmd_write(path, &layout, WritePos::At(index), &values),
        Cmd::Append {
            path,
            layout,
            values,
        } => cmd_write(path, &layout, WritePos::Append, &values),
        Cmd::Get {
            path,
            layout,
            index,
            json,
            raw,
        } => cmd_get(path, &layout, index, json, raw),
        Cmd::Scan { path, layout, json } => cmd_scan(path, &layout, json),
    }
}

fn parse_layout(s: &str) -> Result<RecordLayout> {
    s.parse::<RecordLayout>()
        .with_context(|| format!("parse layout '{}'", s))
}

fn open_store(path: PathBuf, layout: RecordLayout) -> Result<RecordStore> {
    let display = path.display().to_string();
    let mut store = RecordStore::new(path, layout)?;
    store.open().with_context(|| format!("open {}", display))?;
    Ok(store)
}

fn cmd_init(path: PathBuf, layout: &str) -> Result<()> {
    let layout = parse_layout(layout)?;
    let record_len = layout.record_len();
    let mut store = open_store(path, layout)?;
    store.close()?;
    println!(
        "initialized {} (record_len={} B)",
        store.path().display(),
        record_len
    );
    Ok(())
}

#[derive(Serialize)]
struct StatusOut {
    path: String,
    layout: String,
    record_len: usize,
    slots: u64,
    file_bytes: u64,
}

fn cmd_status(path: PathBuf, layout: &str, json: bool) -> Result<()> {
    let layout = parse_layout(layout)?;
    let store = RecordStore::new(path, layout)?;
    // len() смотрит метаданные, открывать store не нужно
    let slots = store.len()?;
    let file_bytes = std::fs::metadata(store.path()).map(|m| m.len()).unwrap_or(0);

    if json {
        let out = StatusOut {
            path: store.path().display().to_string(),
            layout: store.layout().to_string(),
            record_len: store.record_len(),
            slots,
            file_bytes,
        };
        println!("{}", serde_json::to_string(&out)?);
    } else {
        println!("path:       {}", store.path().display());
        println!("layout:     {}", store.layout());
        println!("record_len: {} B", store.record_len());
        println!("slots:      {}", slots);
        println!("file_bytes: {}", file_bytes);
    }
    Ok(())
}

fn parse_values(layout: &RecordLayout, values: &[String]) -> Result<Vec<Value>> {
    if values.len() != layout.fields().len() {
        return Err(anyhow!(
            "{} values given, layout has {} fields",
            values.len(),
            layout.fields().len()
        ));
    }
    let mut out = Vec::with_capacity(values.len());
    for (f, s) in layout.fields().iter().zip(values) {
        let v = Value::parse(&f.kind, s).with_context(|| format!("field '{}'", f.name))?;
        out.push(v);
    }
    Ok(out)
}

fn cmd_write(path: PathBuf, layout: &str, pos: WritePos, values: &[String]) -> Result<()> {
    let layout = parse_layout(layout)?;
    let row = parse_values(&layout, values)?;
    let mut buf = vec![0u8; layout.record_len()];
    encode_row(&layout, &row, &mut buf)?;

    let mut store = open_store(path, layout)?;
    let index = store
        .write_slot(&buf, pos)?
        .ok_or_else(|| anyhow!("store is closed"))?;
    store.close()?;
    println!("wrote slot {}", index);
    Ok(())
}

fn row_json(layout: &RecordLayout, row: &[Value]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (f, v) in layout.fields().iter().zip(row) {
        map.insert(f.name.clone(), value_json(v));
    }
    serde_json::Value::Object(map)
}

fn value_json(v: &Value) -> serde_json::Value {
    match v {
        Value::U8(x) => serde_json::json!(x),
        Value::I8(x) => serde_json::json!(x),
        Value::U16(x) => serde_json::json!(x),
        Value::I16(x) => serde_json::json!(x),
        Value::U32(x) => serde_json::json!(x),
        Value::I32(x) => serde_json::json!(x),
        Value::U64(x) => serde_json::json!(x),
        Value::I64(x) => serde_json::json!(x),
        Value::F32(x) => serde_json::json!(x),
        Value::F64(x) => serde_json::json!(x),
        Value::Bool(x) => serde_json::json!(x),
        Value::Bytes(x) => serde_json::json!(crate::util::to_hex(x)),
        Value::Str(x) => serde_json::json!(x),
    }
}

fn format_row(layout: &RecordLayout, row: &[Value]) -> String {
    let mut out = String::new();
    for (i, (f, v)) in layout.fields().iter().zip(row).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{}={}", f.name, v));
    }
    out
}

fn cmd_get(path: PathBuf, layout: &str, index: u64, json: bool, raw: bool) -> Result<()> {
    let layout = parse_layout(layout)?;
    let mut store = open_store(path, layout)?;
    let slot = store
        .read_slot(index)?
        .ok_or_else(|| anyhow!("store is closed"))?;
    store.close()?;

    let row = decode_row(store.layout(), &slot)?;
    if json {
        println!("{}", row_json(store.layout(), &row));
    } else {
        println!("slot {}: {}", index, format_row(store.layout(), &row));
        if raw {
            println!("hex:\n{}", hex_dump(&slot));
            println!("text: {}", display_text(&slot));
        }
    }
    Ok(())
}

fn cmd_scan(path: PathBuf, layout: &str, json: bool) -> Result<()> {
    let layout = parse_layout(layout)?;
    let mut store = open_store(path, layout)?;
    let slots = store.len()?;

    for i in 0..slots {
        let slot = store
            .read_slot(i)?
            .ok_or_else(|| anyhow!("store is closed"))?;
        let row = decode_row(store.layout(), &slot)?;
        if json {
            println!("{}", row_json(store.layout(), &row));
        } else {
            println!("slot {}: {}", i, format_row(store.layout(), &row));
        }
    }
    store.close()?;
    println!("scanned {} slots", slots);
    Ok(())
}
