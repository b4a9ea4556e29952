//! 配置模块
//!
//! 配置只在启动时组装一次（默认值 → 配置文件 → 命令行参数，密钥来自环境变量），
//! 之后以 [`MakeDocConfig`] 显式传给各个组件。

mod app_config;

pub use app_config::{ConfigError, MakeDocConfig, ENV_API_TOKEN, ENV_API_URL};
