use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::{error, warn};
use std::fs::File;
use std::io::prelude::*;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::{Path, PathBuf};

use crate::param::DEFAULT_MAX_FILE_SIZE;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_www_root")]
    www_root: PathBuf,
    #[serde(default = "default_exec_root")]
    exec_root: PathBuf,
    #[serde(default = "default_allowlist")]
    allowlist: PathBuf,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    local: bool,
    #[serde(default = "default_backlog")]
    backlog: u32,
    #[serde(default = "default_max_file_size")]
    max_file_size: usize,
    #[serde(default)]
    commands: Vec<String>,
}

fn default_www_root() -> PathBuf {
    PathBuf::from("../Data")
}

fn default_exec_root() -> PathBuf {
    PathBuf::from("../Bin")
}

fn default_allowlist() -> PathBuf {
    PathBuf::from("../AllowedClientAddresses.txt")
}

fn default_port() -> u16 {
    80
}

fn default_backlog() -> u32 {
    2
}

fn default_max_file_size() -> usize {
    DEFAULT_MAX_FILE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            www_root: default_www_root(),
            exec_root: default_exec_root(),
            allowlist: default_allowlist(),
            port: default_port(),
            local: false,
            backlog: default_backlog(),
            max_file_size: default_max_file_size(),
            commands: Vec::new(),
        }
    }

    /// 从 TOML 文件读取配置。文件缺失或无法解析时退回默认配置，不会中止启动。
    pub fn from_toml<P: AsRef<Path>>(filename: P) -> Self {
        let filename = filename.as_ref();
        let mut file = match File::open(filename) {
            Ok(f) => f,
            Err(e) => {
                warn!("无法打开配置文件{}：{}，使用默认配置", filename.display(), e);
                return Config::new();
            }
        };
        let mut str_val = String::new();
        if let Err(e) = file.read_to_string(&mut str_val) {
            error!("读取配置文件{}失败：{}，使用默认配置", filename.display(), e);
            return Config::new();
        }
        Self::from_toml_str(&str_val)
    }

    pub fn from_toml_str(str_val: &str) -> Self {
        let mut raw_config: Config = match toml::from_str(str_val) {
            Ok(t) => t,
            Err(e) => {
                error!("无法成功从配置文件构建配置对象，使用默认配置：{}", e);
                Config::new()
            }
        };
        if raw_config.max_file_size == 0 {
            warn!("max_file_size被设置为0，这会使所有文件都无法读取，因此该值将被改为{}。", DEFAULT_MAX_FILE_SIZE);
            raw_config.max_file_size = DEFAULT_MAX_FILE_SIZE;
        }
        if raw_config.backlog == 0 {
            warn!("backlog被设置为0，该值将被改为{}。", default_backlog());
            raw_config.backlog = default_backlog();
        }
        raw_config
    }
}

impl Config {
    pub fn www_root(&self) -> &Path {
        &self.www_root
    }

    pub fn exec_root(&self) -> &Path {
        &self.exec_root
    }

    pub fn allowlist(&self) -> &Path {
        &self.allowlist
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn backlog(&self) -> u32 {
        self.backlog
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// 监听地址：`local` 为真时只监听回环地址
    pub fn address(&self) -> SocketAddrV4 {
        let ip = match self.local {
            true => Ipv4Addr::LOCALHOST,
            false => Ipv4Addr::UNSPECIFIED,
        };
        SocketAddrV4::new(ip, self.port)
    }
}
