// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求解析模块
//!
//! TinyHTTP 只关心请求的第一行，且只接受 `GET <path>` 这一种形式。
//! 请求头即使存在也会被忽略。解析出的路径随即被归类为一个 [`Route`]。

use crate::{exception::Exception, param::*};
use log::{debug, error};

/// 请求目标路径所表达的意图
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`，返回欢迎页面
    Root,
    /// 文档根目录下的普通文件
    StaticFile(String),
    /// `/execute/<name>`，保存的是前缀之后的部分
    Execute(String),
    /// `/server_stop.htm`，返回停机页面并结束服务
    Shutdown,
    /// 无法解析的请求
    Invalid,
}

/// 从原始请求字节中解析出路由。
///
/// 只有形如 `GET <token>` 的第一行才会被接受，且 `<token>` 不得超过
/// [`MAX_TARGET_LEN`] 字节。其余情况一律返回 [`Route::Invalid`]。
pub fn parse_request_line(buffer: &[u8], id: u128) -> Route {
    match request_target(buffer) {
        Ok(path) => {
            debug!("[ID{}]请求路径：{}", id, path);
            classify(path)
        }
        Err(e) => {
            error!("[ID{}]{}：{:?}", id, e, String::from_utf8_lossy(first_line(buffer)));
            Route::Invalid
        }
    }
}

/// 提取请求行中的目标路径
pub fn request_target(buffer: &[u8]) -> Result<&str, Exception> {
    let line = std::str::from_utf8(first_line(buffer)).map_err(|_| Exception::InvalidRequest)?;
    let mut tokens = line.split_ascii_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some("GET"), Some(target)) if target.len() <= MAX_TARGET_LEN => Ok(target),
        _ => Err(Exception::InvalidRequest),
    }
}

fn first_line(buffer: &[u8]) -> &[u8] {
    match buffer.iter().position(|&b| b == b'\n') {
        Some(end) => &buffer[..end],
        None => buffer,
    }
}

/// 按固定的优先级对路径进行归类，先匹配的规则生效。
pub fn classify(path: &str) -> Route {
    if path == ROOT_PATH {
        Route::Root
    } else if let Some(name) = path.strip_prefix(EXECUTE_PREFIX) {
        Route::Execute(name.to_string())
    } else if path == SHUTDOWN_PATH {
        Route::Shutdown
    } else {
        Route::StaticFile(path.to_string())
    }
}
