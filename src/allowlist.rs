// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 客户端地址白名单
//!
//! 白名单由若干 `(网络地址, 掩码)` 对组成，在启动时从纯文本文件载入，之后只读。
//! 文件每行一对，以空白分隔，例如：
//!
//! ```text
//! 192.168.0.0 255.255.255.0
//! 10.0.0.7    255.255.255.255
//! ```
//!
//! 白名单为空时拒绝所有客户端。

use log::{debug, warn};
use std::{fs, io, net::Ipv4Addr, path::Path};

/// 白名单中的一条记录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressMaskEntry {
    network: Ipv4Addr,
    mask: Ipv4Addr,
}

impl AddressMaskEntry {
    pub fn new(network: Ipv4Addr, mask: Ipv4Addr) -> Self {
        Self { network, mask }
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn mask(&self) -> Ipv4Addr {
        self.mask
    }

    /// `(candidate & mask) == (network & mask)`
    pub fn matches(&self, candidate: Ipv4Addr) -> bool {
        let mask = u32::from(self.mask);
        (u32::from(candidate) & mask) == (u32::from(self.network) & mask)
    }

}

/// 白名单文件中一行的解析结果
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Entry(AddressMaskEntry),
    Malformed,
    Blank,
}

impl Line {
    /// 空行与 `#` 开头的注释行视为 `Blank`
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Line::Blank;
        }
        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some(address), Some(mask)) => {
                match (address.parse::<Ipv4Addr>(), mask.parse::<Ipv4Addr>()) {
                    (Ok(network), Ok(mask)) => Line::Entry(AddressMaskEntry::new(network, mask)),
                    _ => Line::Malformed,
                }
            }
            _ => Line::Malformed,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AddressAllowlist {
    entries: Vec<AddressMaskEntry>,
}

impl AddressAllowlist {
    pub fn new(entries: Vec<AddressMaskEntry>) -> Self {
        Self { entries }
    }

    /// 从文件载入白名单。只有文件本身无法读取时才返回错误，格式错误的行会被跳过。
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_lines(&text))
    }

    /// 逐行解析白名单文本。空行与 `#` 开头的注释行被忽略。
    pub fn from_lines(text: &str) -> Self {
        let mut entries = Vec::new();
        for (index, line) in text.lines().enumerate() {
            match Line::parse(line) {
                Line::Entry(entry) => {
                    debug!("白名单第{}行：{} / {}", index + 1, entry.network, entry.mask);
                    entries.push(entry);
                }
                Line::Malformed => {
                    warn!("白名单第{}行格式不正确，已跳过：{}", index + 1, line.trim());
                }
                Line::Blank => {}
            }
        }
        Self { entries }
    }

    pub fn is_allowed(&self, candidate: Ipv4Addr) -> bool {
        self.entries.iter().any(|entry| entry.matches(candidate))
    }

    pub fn entries(&self) -> &[AddressMaskEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
