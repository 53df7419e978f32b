//! # 旧版本报告预处理
//!
//! VASP 5.2.8 写出的 vasprun.xml 在 PRECFOCK 处含有损坏的标签，
//! XML 解析会因此中断。本模块在字节流进入 XML 解析器之前：
//! 1. 读取文件开头（按行数与字节数双重限制），找出 `<i name="version">` 中的版本号；
//! 2. 若为 5.2.8，则把所有含 PRECFOCK 的行替换为一个合法的空元素。
//!
//! 已读取的开头部分通过 `Chain` 重新拼回数据流，整个过程不缓存完整文档。
//!
//! ## 依赖关系
//! - 被 `parsers/vasprun/mod.rs` 使用
//! - 使用 `regex` 提取版本号

use crate::error::{PhonomatError, Result};
use regex::Regex;
use std::io::{self, BufRead, Chain, Cursor, Read};

/// 需要特殊处理的写出程序版本
pub const LEGACY_WRITER_VERSION: &str = "5.2.8";

/// 替换后的 PRECFOCK 行
const PRECFOCK_LINE: &[u8] = b"<i type=\"string\" name=\"PRECFOCK\"></i>\n";

/// 版本号出现在 `<generator>` 中，只扫描文件开头
const VERSION_SCAN_LINES: usize = 64;

/// 无换行的文档也只预读这么多字节
const VERSION_SCAN_BYTES: usize = 16 * 1024;

type Rewound<R> = Chain<Cursor<Vec<u8>>, R>;

/// 经过版本检测后的报告字节流
pub enum ReportSource<R: BufRead> {
    Plain(Rewound<R>),
    Legacy(PrecfockFilter<Rewound<R>>),
}

impl<R: BufRead> ReportSource<R> {
    pub fn is_legacy(&self) -> bool {
        matches!(self, ReportSource::Legacy(_))
    }
}

impl<R: BufRead> Read for ReportSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ReportSource::Plain(r) => r.read(buf),
            ReportSource::Legacy(r) => r.read(buf),
        }
    }
}

/// 检测版本并选择预处理过滤器
pub fn open_report<R: BufRead>(mut reader: R) -> Result<(ReportSource<R>, Option<String>)> {
    let (head, version) = detect_writer_version(&mut reader)?;
    let rewound = Cursor::new(head).chain(reader);

    let source = match version.as_deref() {
        Some(v) if v.contains(LEGACY_WRITER_VERSION) => {
            ReportSource::Legacy(PrecfockFilter::new(rewound))
        }
        _ => ReportSource::Plain(rewound),
    };

    Ok((source, version))
}

/// 读取开头若干行寻找版本号；返回已读取的字节与版本号
fn detect_writer_version<R: BufRead>(reader: &mut R) -> Result<(Vec<u8>, Option<String>)> {
    let pattern = Regex::new(r#"name="version"[^>]*>\s*([^<]*?)\s*<"#)
        .map_err(|e| PhonomatError::StreamParseFailure(e.to_string()))?;

    let mut head = Vec::new();
    for _ in 0..VERSION_SCAN_LINES {
        let start = head.len();
        let budget = VERSION_SCAN_BYTES.saturating_sub(start) as u64;
        if budget == 0 {
            break;
        }
        let n = reader
            .by_ref()
            .take(budget)
            .read_until(b'\n', &mut head)
            .map_err(|e| PhonomatError::StreamParseFailure(e.to_string()))?;
        if n == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&head[start..]);
        if line.contains("\"version\"") {
            let version = pattern
                .captures(&line)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string());
            return Ok((head, version));
        }
    }

    Ok((head, None))
}

/// 逐行替换含 PRECFOCK 的行
pub struct PrecfockFilter<R> {
    inner: R,
    pending: Vec<u8>,
    pos: usize,
}

impl<R: BufRead> PrecfockFilter<R> {
    pub fn new(inner: R) -> Self {
        PrecfockFilter {
            inner,
            pending: Vec::new(),
            pos: 0,
        }
    }

    fn refill(&mut self) -> io::Result<usize> {
        self.pending.clear();
        self.pos = 0;
        let n = self.inner.read_until(b'\n', &mut self.pending)?;
        if n > 0 && contains(&self.pending, b"PRECFOCK") {
            self.pending.clear();
            self.pending.extend_from_slice(PRECFOCK_LINE);
        }
        Ok(n)
    }
}

impl<R: BufRead> Read for PrecfockFilter<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.pending.len() && self.refill()? == 0 {
            return Ok(0);
        }

        let n = buf.len().min(self.pending.len() - self.pos);
        buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
