// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 连接处理器
//!
//! 负责单个 TCP 流的生命周期：读取 → 路由 → 应答 → 关闭。
//!
//! - 读取只进行一次，缓冲区大小为 [`MAX_REQUEST_SIZE`]，超出的部分被截断。
//! - 响应头与正文分两次写出。写出的字节数不足时只记录错误，不会重试。
//! - 无论走哪条路径，连接最终都会被关闭。

use crate::{
    param::MAX_REQUEST_SIZE,
    request::parse_request_line,
    response::{Clock, Response, SystemClock},
    router::{LoopOutcome, Router},
};

use log::{debug, error, info, warn};
use tokio::io::{self, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub struct ConnectionHandler {
    router: Router,
    clock: Box<dyn Clock>,
}

impl ConnectionHandler {
    pub fn new(router: Router) -> Self {
        Self::with_clock(router, Box::new(SystemClock))
    }

    pub fn with_clock(router: Router, clock: Box<dyn Clock>) -> Self {
        Self { router, clock }
    }

    pub async fn handle<S>(&self, stream: &mut S, id: u128) -> LoopOutcome
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        // Reading
        let (request, truncated) = match read_request(stream).await {
            Ok((request, _)) if request.is_empty() => {
                debug!("[ID{}]客户端未发送任何数据", id);
                close(stream, id).await;
                return LoopOutcome::Continue;
            }
            Ok(read) => read,
            Err(e) => {
                error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
                close(stream, id).await;
                return LoopOutcome::Continue;
            }
        };
        if truncated {
            warn!("[ID{}]请求填满了{}字节的缓冲区，超出部分已被截断", id, request.len());
        }
        debug!("[ID{}]HTTP请求接收完毕：{:?}", id, String::from_utf8_lossy(&request));

        // Routing
        let route = parse_request_line(&request, id);
        info!("[ID{}]路由：{:?}", id, route);
        let handled = self.router.handle(route, id).await;

        // Responding
        if let Some(response) = &handled.response {
            self.send(stream, response, id).await;
        }

        // Closed
        close(stream, id).await;
        handled.outcome
    }

    async fn send<S>(&self, stream: &mut S, response: &Response, id: u128)
    where
        S: AsyncWrite + Unpin,
    {
        info!(
            "[ID{}]{} {}, {} bytes",
            id,
            response.status_code(),
            response.status().reason(),
            response.content_length()
        );
        let header = response.header(self.clock.as_ref());
        send_data(stream, &header, id).await;
        if !response.content().is_empty() {
            send_data(stream, response.content(), id).await;
        }
    }
}

/// 只读取一次。第二个返回值表示请求填满了缓冲区，超出的部分没有被读取。
async fn read_request<S>(stream: &mut S) -> io::Result<(Vec<u8>, bool)>
where
    S: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; MAX_REQUEST_SIZE];
    let size = stream.read(&mut buffer).await?;
    buffer.truncate(size);
    Ok((buffer, size == MAX_REQUEST_SIZE))
}

/// 写出一段数据，只尝试一次
async fn send_data<S>(stream: &mut S, data: &[u8], id: u128)
where
    S: AsyncWrite + Unpin,
{
    debug!("[ID{}]发送{}字节", id, data.len());
    match stream.write(data).await {
        Ok(n) if n == data.len() => {}
        Ok(n) => error!("[ID{}]数据未能完整写出：{} / {} 字节", id, n, data.len()),
        Err(e) => error!("[ID{}]写入TCPStream时遇到错误: {}", id, e),
    }
}

async fn close<S>(stream: &mut S, id: u128)
where
    S: AsyncWrite + Unpin,
{
    debug!("[ID{}]关闭连接", id);
    if let Err(e) = stream.shutdown().await {
        debug!("[ID{}]关闭连接时遇到错误: {}", id, e);
    }
}
