//! util — общие хелперы для hex-представления байтов.
//!
//! Используются CLI (поля bytes задаются hex-строкой, слоты печатаются
//! hex-дампом) и тестами.

use anyhow::{anyhow, Result};

/// Разобрать hex-строку (чётной длины) в байты.
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    if !s.is_ascii() {
        return Err(anyhow!("hex string must be ASCII"));
    }
    if s.len() % 2 != 0 {
        return Err(anyhow!("hex string must have even length"));
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    for i in (0..s.len()).step_by(2) {
        let byte = u8::from_str_radix(&s[i..i + 2], 16)
            .map_err(|_| anyhow!("invalid hex at pos {}", i))?;
        out.push(byte);
    }
    Ok(out)
}

/// Компактная hex-строка без разделителей.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{:02x}", b));
    }
    s
}

/// Hex-дамп по 16 байт в строке (для печати слотов).
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            if i % 16 == 0 {
                out.push('\n');
            } else {
                out.push(' ');
            }
        }
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// Печатаемое представление байтов: UTF-8 текст либо пометка о размере.
pub fn display_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => format!("(binary {} B)", bytes.len()),
    }
}
