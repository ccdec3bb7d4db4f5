// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由引擎
//!
//! 把 [`Route`] 转换为响应正文，并决定主循环是否继续。
//!
//! ## 路由规则：
//! 1. `/` -> 文档根目录下的 `index.htm`。
//! 2. `/execute/<name>` -> 执行 `<name>` 并返回其输出。
//! 3. `/server_stop.htm` -> 返回停机页面，随后结束主循环。
//! 4. 其余路径 -> 文档根目录下的同名文件。
//!
//! 任何找不到内容的情况都以 `404.htm` 作答；若该页面本身也不存在，则只发送一个空正文的 404。

use crate::{
    content::ContentSource,
    exception::Exception,
    param::{HTML_404, HTML_INDEX, SHUTDOWN_PATH},
    request::Route,
    response::{Response, ResponseStatus},
};

use bytes::Bytes;
use log::{error, info, warn};

/// 主循环在处理完一个连接之后的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    Continue,
    Stop,
    /// 致命错误，携带进程退出码
    Fatal(i32),
}

impl LoopOutcome {
    pub fn is_continue(&self) -> bool {
        matches!(self, LoopOutcome::Continue)
    }

    /// 主循环结束后的进程退出码
    pub fn exit_code(&self) -> i32 {
        match self {
            LoopOutcome::Continue | LoopOutcome::Stop => 0,
            LoopOutcome::Fatal(code) => *code,
        }
    }
}

/// 一次路由的结果。`response` 为 `None` 时不向客户端发送任何内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handled {
    pub response: Option<Response>,
    pub outcome: LoopOutcome,
}

impl Handled {
    fn reply(response: Response) -> Self {
        Self {
            response: Some(response),
            outcome: LoopOutcome::Continue,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    content: ContentSource,
}

impl Router {
    pub fn new(content: ContentSource) -> Self {
        Self { content }
    }

    pub async fn handle(&self, route: Route, id: u128) -> Handled {
        match route {
            Route::Root => {
                let result = self.content.read_static_file(HTML_INDEX, id).await;
                Handled::reply(self.respond(result, ResponseStatus::OK, id).await)
            }
            Route::StaticFile(path) => {
                let result = self.content.read_static_file(&path, id).await;
                Handled::reply(self.respond(result, ResponseStatus::OK, id).await)
            }
            Route::Execute(name) => {
                let result = self.content.capture_command_output(&name, id).await;
                Handled::reply(self.respond(result, ResponseStatus::OK, id).await)
            }
            Route::Shutdown => {
                info!("[ID{}]收到停机请求", id);
                let result = self.content.read_static_file(SHUTDOWN_PATH, id).await;
                Handled {
                    response: Some(self.respond(result, ResponseStatus::STOPPING, id).await),
                    outcome: LoopOutcome::Stop,
                }
            }
            Route::Invalid => {
                error!("[ID{}]无效的请求，不作应答", id);
                Handled {
                    response: None,
                    outcome: LoopOutcome::Continue,
                }
            }
        }
    }

    async fn respond(&self, result: Result<Bytes, Exception>, status: ResponseStatus, id: u128) -> Response {
        match result {
            Ok(content) => Response::new(status, content),
            Err(e) => {
                warn!("[ID{}]{}，返回404", id, e);
                self.not_found(id).await
            }
        }
    }

    /// 404 页面只尝试读取一次，失败后退化为空正文。
    async fn not_found(&self, id: u128) -> Response {
        match self.content.read_static_file(HTML_404, id).await {
            Ok(content) => Response::new(ResponseStatus::NOT_FOUND, content),
            Err(e) => {
                error!("[ID{}]无法读取404页面：{}，发送空正文", id, e);
                Response::empty_404()
            }
        }
    }
}
