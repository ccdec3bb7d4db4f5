// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 监听与主循环
//!
//! `Acceptor` 持有唯一的监听 Socket，按顺序逐个接受连接：
//! 一个连接被完整处理并关闭之后，才会接受下一个连接。
//!
//! 主循环只会因为两种原因结束：收到停机请求，或者 `accept` 返回了 `EINVAL`。
//! 后者被视为致命错误，以避免在该状态下无休止地空转重试。

use crate::{
    allowlist::AddressAllowlist,
    connection::ConnectionHandler,
    router::LoopOutcome,
    util::{describe_error, log_failed_call},
};

use log::{debug, error, info, warn, Level};
use tokio::net::{TcpListener, TcpSocket, TcpStream};

use std::{
    io,
    net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4},
};

/// `EINVAL` 的取值，用于构造致命错误的退出码
const EINVAL: i32 = 22;

/// 创建并绑定监听 Socket
pub fn bind(address: SocketAddrV4, backlog: u32) -> io::Result<TcpListener> {
    info!("正在创建Socket...");
    let socket = TcpSocket::new_v4().map_err(|e| {
        log_failed_call(Level::Error, "socket()", &e);
        e
    })?;
    socket.set_reuseaddr(true).map_err(|e| {
        log_failed_call(Level::Error, "setsockopt(SO_REUSEADDR)", &e);
        e
    })?;
    info!("正在绑定{}...", address);
    socket.bind(SocketAddr::V4(address)).map_err(|e| {
        log_failed_call(Level::Error, "bind()", &e);
        e
    })?;
    socket.listen(backlog).map_err(|e| {
        log_failed_call(Level::Error, "listen()", &e);
        e
    })
}

pub struct Acceptor<'a> {
    listener: TcpListener,
    allowlist: &'a AddressAllowlist,
    handler: ConnectionHandler,
}

impl<'a> Acceptor<'a> {
    pub fn new(listener: TcpListener, allowlist: &'a AddressAllowlist, handler: ConnectionHandler) -> Self {
        Self {
            listener,
            allowlist,
            handler,
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// 主循环。返回值为 `Stop` 或 `Fatal`，返回时监听 Socket 已被关闭。
    pub async fn run(self) -> LoopOutcome {
        info!("开始处理请求...");
        let mut id: u128 = 0;
        let mut outcome = LoopOutcome::Continue;

        while outcome.is_continue() {
            outcome = match self.listener.accept().await {
                Ok((mut stream, peer)) => {
                    debug!("[ID{}]新的连接：{}", id, peer);
                    let outcome = self.serve(&mut stream, peer, id).await;
                    id += 1;
                    outcome
                }
                Err(e) => accept_failed(&e),
            };
        }

        info!("主循环结束：{:?}，正在关闭Socket...", outcome);
        drop(self.listener);
        outcome
    }

    async fn serve(&self, stream: &mut TcpStream, peer: SocketAddr, id: u128) -> LoopOutcome {
        if !self.is_allowed(peer) {
            warn!("[ID{}]客户端地址不在白名单中：{}，直接关闭连接", id, peer);
            return LoopOutcome::Continue;
        }
        self.handler.handle(stream, id).await
    }

    fn is_allowed(&self, peer: SocketAddr) -> bool {
        match peer_ipv4(peer) {
            Some(ip) => self.allowlist.is_allowed(ip),
            None => false,
        }
    }
}

/// 对端的 IPv4 地址。IPv4 映射的 IPv6 地址也被接受。
fn peer_ipv4(peer: SocketAddr) -> Option<Ipv4Addr> {
    match peer.ip() {
        IpAddr::V4(ip) => Some(ip),
        IpAddr::V6(ip) => ip.to_ipv4_mapped(),
    }
}

/// `accept` 失败时主循环的去向
pub fn accept_failed(err: &io::Error) -> LoopOutcome {
    error!("accept()  failed: {}", describe_error(err));
    match err.raw_os_error() {
        Some(EINVAL) => LoopOutcome::Fatal(-EINVAL),
        Some(_) => LoopOutcome::Continue,
        None if err.kind() == io::ErrorKind::InvalidInput => LoopOutcome::Fatal(-EINVAL),
        None => LoopOutcome::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{content::ContentSource, router::Router};
    use std::{fs, time::Duration};
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn test_einval_is_fatal() {
        let err = io::Error::from_raw_os_error(EINVAL);
        assert_eq!(accept_failed(&err), LoopOutcome::Fatal(-22));
    }

    #[test]
    fn test_other_accept_errors_continue() {
        // EMFILE
        let err = io::Error::from_raw_os_error(24);
        assert_eq!(accept_failed(&err), LoopOutcome::Continue);
        let err = io::Error::new(io::ErrorKind::ConnectionAborted, "aborted");
        assert_eq!(accept_failed(&err), LoopOutcome::Continue);
    }

    #[tokio::test]
    async fn test_bind_reuses_released_port() {
        let first = bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0), 2).unwrap();
        let address = match first.local_addr().unwrap() {
            SocketAddr::V4(a) => a,
            SocketAddr::V6(a) => panic!("unexpected address {}", a),
        };
        // 端口仍在监听时再次绑定失败
        assert!(bind(address, 2).is_err());
        drop(first);
        assert!(bind(address, 2).is_ok());
    }

    #[test]
    fn test_peer_ipv4() {
        let v4: SocketAddr = "10.1.2.3:5000".parse().unwrap();
        assert_eq!(peer_ipv4(v4), Some(Ipv4Addr::new(10, 1, 2, 3)));
        let mapped: SocketAddr = "[::ffff:10.1.2.3]:5000".parse().unwrap();
        assert_eq!(peer_ipv4(mapped), Some(Ipv4Addr::new(10, 1, 2, 3)));
        let v6: SocketAddr = "[::1]:5000".parse().unwrap();
        assert_eq!(peer_ipv4(v6), None);
    }

    async fn request(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request).await.unwrap();
        let mut received = Vec::new();
        let _ = stream.read_to_end(&mut received).await;
        received
    }

    #[tokio::test]
    async fn test_loop_until_shutdown() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.htm"), "hi").unwrap();
        fs::write(dir.path().join("server_stop.htm"), "bye").unwrap();

        let allowlist = AddressAllowlist::from_lines("127.0.0.0 255.0.0.0");
        let listener = bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0), 2).unwrap();
        let handler = ConnectionHandler::new(Router::new(ContentSource::new(dir.path(), dir.path())));
        let acceptor = Acceptor::new(listener, &allowlist, handler);
        let addr = acceptor.local_addr().unwrap();

        let client = async {
            let first = request(addr, b"GET /\r\n").await;
            let second = request(addr, b"GET /server_stop.htm\r\n").await;
            (first, second)
        };
        let (outcome, (first, second)) =
            tokio::time::timeout(Duration::from_secs(10), async { tokio::join!(acceptor.run(), client) })
                .await
                .unwrap();

        assert_eq!(outcome, LoopOutcome::Stop);
        assert_eq!(outcome.exit_code(), 0);
        assert!(first.ends_with(b"\r\n\r\nhi"));
        assert!(second.ends_with(b"\r\n\r\nbye"));
    }

    #[tokio::test]
    async fn test_denied_peer_gets_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.htm"), "hi").unwrap();

        let allowlist = AddressAllowlist::from_lines("10.0.0.0 255.0.0.0");
        let listener = bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0), 2).unwrap();
        let handler = ConnectionHandler::new(Router::new(ContentSource::new(dir.path(), dir.path())));
        let acceptor = Acceptor::new(listener, &allowlist, handler);
        let addr = acceptor.local_addr().unwrap();

        let received = tokio::time::timeout(Duration::from_secs(10), async {
            tokio::select! {
                outcome = acceptor.run() => panic!("accept loop ended: {:?}", outcome),
                received = request(addr, b"GET /\r\n") => received,
            }
        })
        .await
        .unwrap();

        assert!(received.is_empty());
    }
}
