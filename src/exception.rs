// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了 TinyHTTP 在单个连接的处理过程中可能出现的各类异常情况。
//!
//! ## 设计意图
//! - **错误分类**：涵盖了请求行解析错误、文件系统错误以及外部命令执行错误。
//! - **语义映射**：除 `InvalidRequest` 外，所有变体最终都被路由层转换为 `404 ERROR` 响应。
//! - **不跨越边界**：各组件通过 `Result` 返回异常，由调用方检查，绝不以 panic 的形式传播。

use std::fmt;

/// 服务器处理请求过程中发生的异常类型。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Exception {
    /// 请求行不符合 `GET <path>` 的格式，或路径超出了长度上限。
    InvalidRequest,
    /// 在文档根目录下未找到所请求的文件，或文件为空。
    FileNotFound,
    /// 请求的路径试图越出文档根目录（如 `..`）。
    InvalidPath,
    /// `/execute/` 后的命令名不合法，或不在配置的命令列表中。
    CommandRejected,
    /// 外部命令无法启动。
    CommandNotLaunched,
    /// 外部命令以非零状态退出。
    CommandFailed,
    /// 无法读取系统时钟。
    ClockUnavailable,
}

use Exception::*;

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidRequest => write!(f, "Invalid request"),
            FileNotFound => write!(f, "File not found (404)"),
            InvalidPath => write!(f, "Path escapes the document root"),
            CommandRejected => write!(f, "Command name rejected"),
            CommandNotLaunched => write!(f, "Couldn't launch the command"),
            CommandFailed => write!(f, "The command exited with a failure status"),
            ClockUnavailable => write!(f, "System clock unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_human_readable() {
        assert_eq!(FileNotFound.to_string(), "File not found (404)");
        assert_eq!(InvalidRequest.to_string(), "Invalid request");
        assert!(CommandFailed.to_string().contains("failure"));
    }
}
