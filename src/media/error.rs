//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载媒体适配链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 流水线内部各阶段在输入合法时都是全函数，因此这里没有“可重试”的分支：
//! 重试（如果需要）属于调用方对整条流水线的包装。

/// 媒体适配统一错误类型。
///
/// 该类型会在服务层被上转为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// 输入字节无法解码为图片/GIF，或 GIF 提取后没有任何帧。
    #[error("不支持的媒体：{0}")]
    UnsupportedMedia(String),

    /// 参数错误（画布尺寸非法、配置越界等）。
    #[error("参数错误：{0}")]
    InvalidParameter(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("编码错误：{0}")]
    Encode(String),
}

impl MediaError {
    /// 稳定错误码，供外层 API 映射。
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedMedia(_) => "E_UNSUPPORTED_MEDIA",
            Self::InvalidParameter(_) => "E_INVALID_PARAMETER",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::FileSystem(_) => "E_FILE_SYSTEM",
            Self::Encode(_) => "E_ENCODE",
        }
    }

    /// 出错的流水线阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::UnsupportedMedia(_) => "decode",
            Self::InvalidParameter(_) => "config",
            Self::ResourceLimit(_) => "decode",
            Self::FileSystem(_) => "load",
            Self::Encode(_) => "encode",
        }
    }
}
