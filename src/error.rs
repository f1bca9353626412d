//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，汇总媒体流水线与设备传输两类错误，
//! 服务层入口统一返回 `Result<T, AppError>`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `MediaError` / `TransportError` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，供外层 API 直接返回。

use serde::Serialize;

use crate::device::TransportError;
use crate::media::MediaError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 媒体适配流水线错误（加载 / 解码 / 编码）
    #[error("{0}")]
    Media(#[from] MediaError),

    /// 设备传输失败
    #[error("设备传输失败: {0}")]
    Transport(#[from] TransportError),

    /// 后台处理任务异常退出
    #[error("后台任务失败: {0}")]
    Task(String),
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
