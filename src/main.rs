// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # TinyHTTP
//!
//! 单线程、顺序处理的极简 HTTP 服务器：
//! - 基于 IPv4 白名单的访问控制
//! - 从固定的文档根目录提供静态文件
//! - 通过 `/execute/<name>` 执行外部命令并返回其输出
//! - 通过 `/server_stop.htm` 远程停机
//!
//! 启动阶段的致命错误以出错位置的源码行号作为进程退出码。

use tinyhttp::{
    param::{SERVER_NAME, SERVER_VERSION},
    server,
    util::{log_event, log_failed_call},
    Acceptor, AddressAllowlist, Config, ConnectionHandler, ContentSource, Router,
};

use log::{info, warn, Level, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config as LogConfig, Root},
    encode::pattern::PatternEncoder,
};
use tokio::runtime::Builder;

use std::{env, process};

const LOG_CONFIG: &str = "config/log4rs.yaml";
const CONFIG_FILE: &str = "config/tinyhttp.toml";

fn main() {
    // 1. 初始化日志系统：优先使用外部 YAML 配置，缺失时退回到控制台输出
    if let Err(e) = init_logging() {
        eprintln!("FATAL ERROR  无法初始化日志系统：{}", e);
        process::exit(line!() as i32);
    }
    log_event(&format!("{} - Version {}", SERVER_NAME, SERVER_VERSION));

    // 2. 载入配置，命令行第一个参数可以指定配置文件路径
    let config_path = env::args().nth(1).unwrap_or_else(|| CONFIG_FILE.to_string());
    let config = Config::from_toml(&config_path);
    info!("配置文件已载入：{}", config_path);
    info!("www root: {}", config.www_root().display());

    // 3. 载入白名单。文件无法打开时中止启动。
    let allowlist = match AddressAllowlist::load(config.allowlist()) {
        Ok(list) => list,
        Err(e) => {
            log_failed_call(Level::Error, &format!("open({})", config.allowlist().display()), &e);
            process::exit(line!() as i32);
        }
    };
    if allowlist.is_empty() {
        warn!("白名单为空，所有客户端都将被拒绝");
    } else {
        info!("白名单已载入，共{}条记录", allowlist.len());
    }

    // 4. 单线程运行时：连接被逐个顺序处理
    let runtime = match Builder::new_current_thread().enable_all().build() {
        Ok(r) => r,
        Err(e) => {
            log_failed_call(Level::Error, "Runtime::build()", &e);
            process::exit(line!() as i32);
        }
    };

    let code = runtime.block_on(run(&config, &allowlist));
    info!("服务器退出，退出码：{}", code);
    process::exit(code);
}

async fn run(config: &Config, allowlist: &AddressAllowlist) -> i32 {
    let listener = match server::bind(config.address(), config.backlog()) {
        Ok(l) => l,
        Err(_) => return line!() as i32,
    };
    info!("{}端口绑定完成", config.port());

    let router = Router::new(ContentSource::from_config(config));
    let acceptor = Acceptor::new(listener, allowlist, ConnectionHandler::new(router));
    acceptor.run().await.exit_code()
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    if log4rs::init_file(LOG_CONFIG, Default::default()).is_ok() {
        return Ok(());
    }
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} {h({l})} {m}{n}")))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))?;
    log4rs::init_config(config)?;
    warn!("无法载入{}，使用默认的控制台日志", LOG_CONFIG);
    Ok(())
}
