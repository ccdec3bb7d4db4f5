// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块集中定义了 TinyHTTP 使用的固定常量：
//! - 响应头中固定的字段值（服务器名、内容类型）。
//! - 各类缓冲区容量上限。
//! - 特殊路由的路径与默认资源文件名。

use lazy_static::lazy_static;
use regex::Regex;

/// 服务器名称标识，用于 HTTP 响应头的 `Server` 字段
pub const SERVER_NAME: &str = "TinyHTTP";

/// 服务器版本，仅用于启动日志
pub const SERVER_VERSION: &str = "0.0";

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 所有响应都使用同一种内容类型
pub const CONTENT_TYPE: &str = "text/html";

/// 单次读取请求时使用的缓冲区大小。超出部分被静默截断。
pub const MAX_REQUEST_SIZE: usize = 1024;

/// 请求目标（路径）的最大字节数
pub const MAX_TARGET_LEN: usize = 16;

/// 读取静态文件时的默认缓冲区上限（16 KiB）
pub const DEFAULT_MAX_FILE_SIZE: usize = 16 * 1024;

/// 时钟不可用时写入 `Date` 字段的替代文本
pub const DATE_ERROR: &str = "ERROR  clock unavailable";

// --- 路由 ---

pub const ROOT_PATH: &str = "/";
pub const EXECUTE_PREFIX: &str = "/execute/";
pub const SHUTDOWN_PATH: &str = "/server_stop.htm";

/// `/` 对应的欢迎页面
pub const HTML_INDEX: &str = "/index.htm";
/// 找不到资源时返回的页面
pub const HTML_404: &str = "/404.htm";
/// 外部命令的标准输出被重定向到文档根目录下的这个文件
pub const COMMAND_OUTPUT: &str = "/Output.txt";

lazy_static! {
    /// `/execute/` 之后允许出现的命令名。
    ///
    /// 只允许单个路径分量，不得以 `.` 开头，因此 `..` 与隐藏文件都无法匹配。
    pub static ref COMMAND_NAME: Regex = Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]*$").unwrap();
}
