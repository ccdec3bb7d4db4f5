// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 内容来源
//!
//! 把请求路径解析为字节正文。正文有两种来源：
//! 1. 文档根目录下的静态文件；
//! 2. `exec_root` 下某个外部命令的标准输出。命令的输出先被重定向到文档根目录下的
//!    `Output.txt`，再按静态文件读取。
//!
//! 找不到内容不是错误，而是以 `Exception` 的形式返回给路由层，由它改为发送 404 页面。

use crate::{
    config::Config,
    exception::Exception,
    param::{COMMAND_NAME, COMMAND_OUTPUT, DEFAULT_MAX_FILE_SIZE},
    util::log_failed_call,
};

use bytes::Bytes;
use log::{debug, error, warn, Level};
use tokio::{fs::File, io::AsyncReadExt, process::Command};

use std::{
    path::{Component, Path, PathBuf},
    process::Stdio,
};

#[derive(Debug, Clone)]
pub struct ContentSource {
    www_root: PathBuf,
    exec_root: PathBuf,
    max_file_size: usize,
    commands: Vec<String>,
}

impl ContentSource {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(www_root: P, exec_root: Q) -> Self {
        Self {
            www_root: www_root.into(),
            exec_root: exec_root.into(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            commands: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.www_root(), config.exec_root())
            .with_max_file_size(config.max_file_size())
            .with_commands(config.commands().to_vec())
    }

    pub fn with_max_file_size(mut self, max_file_size: usize) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// 限定 `/execute/` 可调用的命令。列表为空时，任何合法的命令名都可以调用。
    pub fn with_commands(mut self, commands: Vec<String>) -> Self {
        self.commands = commands;
        self
    }

    /// 把请求路径映射到文档根目录之下。含有 `..` 等分量的路径会被拒绝。
    pub fn resolve(&self, path: &str) -> Result<PathBuf, Exception> {
        confine(&self.www_root, path)
    }

    /// 读取文档根目录下的静态文件，最多读取 `max_file_size` 字节。
    pub async fn read_static_file(&self, path: &str, id: u128) -> Result<Bytes, Exception> {
        let full_path = match self.resolve(path) {
            Ok(p) => p,
            Err(e) => {
                warn!("[ID{}]拒绝越出文档根目录的路径：{}", id, path);
                return Err(e);
            }
        };
        debug!("[ID{}]映射物理路径：{}", id, full_path.display());
        let (content, truncated) = read_bounded(&full_path, self.max_file_size, id).await?;
        if truncated {
            warn!(
                "[ID{}]文件{}的大小达到了缓冲区上限（{}字节），内容可能被截断",
                id,
                full_path.display(),
                self.max_file_size
            );
        }
        Ok(content)
    }

    /// 执行外部命令，并以静态文件的方式读取其输出。
    pub async fn capture_command_output(&self, name: &str, id: u128) -> Result<Bytes, Exception> {
        if !self.is_command_allowed(name) {
            warn!("[ID{}]拒绝执行命令：{:?}", id, name);
            return Err(Exception::CommandRejected);
        }
        let program = self.exec_root.join(name);
        let output_path = self.resolve(COMMAND_OUTPUT)?;

        let output = match File::create(&output_path).await {
            Ok(f) => f.into_std().await,
            Err(e) => {
                log_failed_call(Level::Error, "File::create(Output.txt)", &e);
                return Err(Exception::CommandNotLaunched);
            }
        };

        debug!("[ID{}]执行命令：{}", id, program.display());
        let status = Command::new(&program)
            .stdin(Stdio::null())
            .stdout(Stdio::from(output))
            .status()
            .await;
        match status {
            Ok(s) if s.success() => {}
            Ok(s) => {
                error!("[ID{}]命令{}执行失败：{}", id, name, s);
                return Err(Exception::CommandFailed);
            }
            Err(e) => {
                error!("[ID{}]无法启动命令{}：{}", id, program.display(), e);
                return Err(Exception::CommandNotLaunched);
            }
        }

        self.read_static_file(COMMAND_OUTPUT, id).await
    }

    fn is_command_allowed(&self, name: &str) -> bool {
        COMMAND_NAME.is_match(name)
            && (self.commands.is_empty() || self.commands.iter().any(|c| c == name))
    }
}

fn confine(root: &Path, path: &str) -> Result<PathBuf, Exception> {
    let relative = Path::new(path.trim_start_matches('/'));
    let mut full_path = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => full_path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Exception::InvalidPath)
            }
        }
    }
    Ok(full_path)
}

/// 最多读取 `max_size` 字节。第二个返回值表示内容是否填满了上限，此时文件可能被截断。
async fn read_bounded(path: &Path, max_size: usize, id: u128) -> Result<(Bytes, bool), Exception> {
    let file = match File::open(path).await {
        Ok(f) => f,
        Err(e) => {
            debug!("[ID{}]无法打开文件{}：{}", id, path.display(), e);
            return Err(Exception::FileNotFound);
        }
    };

    let mut buffer = Vec::with_capacity(max_size);
    if let Err(e) = file.take(max_size as u64).read_to_end(&mut buffer).await {
        error!("[ID{}]读取文件{}失败：{}", id, path.display(), e);
        return Err(Exception::FileNotFound);
    }

    if buffer.is_empty() {
        warn!("[ID{}]文件{}为空", id, path.display());
        return Err(Exception::FileNotFound);
    }
    let truncated = buffer.len() == max_size;
    Ok((Bytes::from(buffer), truncated))
}
