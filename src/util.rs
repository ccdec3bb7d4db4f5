use std::io;

use log::{info, log, Level};

/// 记录一条普通事件
pub fn log_event(msg: &str) {
    info!("{}", msg);
}

/// 记录一次失败的系统调用，包括返回的错误码
pub fn log_failed_call(level: Level, call: &str, err: &io::Error) {
    log!(level, "{}  failed", call);
    log!(level, "    {}", describe_error(err));
}

/// 错误描述，带上 errno（如果有的话）
pub fn describe_error(err: &io::Error) -> String {
    match err.raw_os_error() {
        Some(code) => format!("errno = {} ({})", code, err),
        None => format!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_os_error() {
        let err = io::Error::from_raw_os_error(22);
        assert!(describe_error(&err).starts_with("errno = 22"));
    }

    #[test]
    fn test_describe_custom_error() {
        let err = io::Error::new(io::ErrorKind::Other, "boom");
        assert_eq!(describe_error(&err), "boom");
    }
}
