// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 响应构建模块
//!
//! 所有响应都由一个头部与一段原始字节正文组成。头部字段的顺序固定：
//! 状态行、`Date`、`Server`、`Content-Length`、`Content-Type`，最后是空行。

use crate::{exception::Exception, param::*};

use bytes::Bytes;
use chrono::prelude::*;
use log::{debug, error};

use std::time::{SystemTime, UNIX_EPOCH};

/// 状态码与原因短语
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseStatus {
    code: u16,
    reason: &'static str,
}

impl ResponseStatus {
    pub const OK: ResponseStatus = ResponseStatus::new(200, "OK");
    pub const NOT_FOUND: ResponseStatus = ResponseStatus::new(404, "ERROR");
    /// 停机页面使用的状态
    pub const STOPPING: ResponseStatus = ResponseStatus::new(200, "STOPPING");

    pub const fn new(code: u16, reason: &'static str) -> Self {
        Self { code, reason }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

/// 当前 UTC 时间的来源
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    fn now(&self) -> Result<DateTime<Utc>, Exception>;
}

/// 读取系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<DateTime<Utc>, Exception> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| Exception::ClockUnavailable)?;
        let secs = i64::try_from(elapsed.as_secs()).map_err(|_| Exception::ClockUnavailable)?;
        DateTime::from_timestamp(secs, elapsed.subsec_nanos()).ok_or(Exception::ClockUnavailable)
    }
}

/// 与 C 语言 `asctime` 相同的布局，例如 `Thu Oct 16 09:05:03 2026`
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%a %b %e %H:%M:%S %Y").to_string()
}

/// 构建响应头。时钟不可用时以固定的错误文本代替日期，响应照常发送。
pub fn build_header(status: ResponseStatus, content_length: usize, clock: &dyn Clock) -> Vec<u8> {
    let date = match clock.now() {
        Ok(now) => format_date(&now),
        Err(e) => {
            error!("无法获取当前时间：{}", e);
            DATE_ERROR.to_string()
        }
    };
    let header = [
        "HTTP/1.1 ",
        &status.code.to_string(),
        " ",
        status.reason,
        CRLF,
        "Date: ",
        &date,
        " GMT",
        CRLF,
        "Server: ",
        SERVER_NAME,
        CRLF,
        "Content-Length: ",
        &content_length.to_string(),
        CRLF,
        "Content-Type: ",
        CONTENT_TYPE,
        CRLF,
        CRLF,
    ]
    .concat();
    debug!("响应头：{:?}", header);
    header.into_bytes()
}

/// 一次完整的响应：状态与正文。头部在发送时才根据当前时间生成。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: ResponseStatus,
    content: Bytes,
}

impl Response {
    pub fn new(status: ResponseStatus, content: Bytes) -> Self {
        Self { status, content }
    }

    /// 连 404 页面本身都缺失时使用的空正文响应
    pub fn empty_404() -> Self {
        Self::new(ResponseStatus::NOT_FOUND, Bytes::new())
    }

    pub fn status(&self) -> ResponseStatus {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.code
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn content_length(&self) -> usize {
        self.content.len()
    }

    pub fn header(&self, clock: &dyn Clock) -> Vec<u8> {
        build_header(self.status, self.content.len(), clock)
    }
}
