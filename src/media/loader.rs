//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（内存字节 / Base64 / 本地文件）的原始字节加载，
//! 并在“尽可能早”的阶段执行输入校验，尽快失败，减少不必要内存与 CPU 消耗。
//!
//! ## 实现思路
//!
//! - 内存字节：体积校验。
//! - Base64：格式解析 + 解码前按长度估算体积上限。
//! - 文件：存在性 + metadata 体积限制 + 读取。
//! - 最后统一用文件签名识别媒体类别：GIF 走动图链路，其余图片走静态图链路。

use base64::{Engine as _, engine::general_purpose};
use std::path::Path;

use super::source::RawMedia;
use super::{MediaConfig, MediaError, MediaKind, MediaSource};

/// 按来源加载原始字节并识别类别。
pub(crate) fn load(source: MediaSource, config: &MediaConfig) -> Result<RawMedia, MediaError> {
    let (bytes, source_hint) = match source {
        MediaSource::Bytes(bytes) => {
            validate_input_size(bytes.len() as u64, config)?;
            (bytes, "bytes")
        }
        MediaSource::Base64(data) => (parse_base64_with_limit(&data, config.max_input_bytes)?, "base64"),
        MediaSource::FilePath(path) => (load_from_file(&path, config)?, "file"),
    };

    let kind = detect_kind(&bytes)?;
    log::info!(
        "📥 媒体加载完成 - 来源: {} 类别: {:?} 大小: {:.1} KB",
        source_hint,
        kind,
        bytes.len() as f64 / 1024.0
    );

    Ok(RawMedia {
        bytes,
        source_hint,
        kind,
    })
}

/// 依据文件签名判断媒体类别。
pub(crate) fn detect_kind(bytes: &[u8]) -> Result<MediaKind, MediaError> {
    if bytes.is_empty() {
        return Err(MediaError::UnsupportedMedia("媒体内容为空".to_string()));
    }

    let kind = infer::get(bytes)
        .ok_or_else(|| MediaError::UnsupportedMedia("无法识别媒体类型".to_string()))?;

    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(MediaError::UnsupportedMedia(format!(
            "文件签名不是图片类型：{}",
            kind.mime_type()
        )));
    }

    if kind.mime_type() == "image/gif" {
        Ok(MediaKind::Animation)
    } else {
        Ok(MediaKind::Still)
    }
}

fn validate_input_size(len: u64, config: &MediaConfig) -> Result<(), MediaError> {
    if len > config.max_input_bytes {
        return Err(MediaError::ResourceLimit(format!(
            "输入过大：{:.2} MB（限制：{:.2} MB）",
            len as f64 / 1024.0 / 1024.0,
            config.max_input_bytes as f64 / 1024.0 / 1024.0
        )));
    }
    Ok(())
}

fn load_from_file(path: &str, config: &MediaConfig) -> Result<Vec<u8>, MediaError> {
    log::info!("📁 开始读取本地媒体 - 路径: {}", path);

    let file_path = Path::new(path);
    if !file_path.exists() {
        return Err(MediaError::FileSystem(format!("文件不存在：{}", path)));
    }

    let metadata = std::fs::metadata(file_path)
        .map_err(|e| MediaError::FileSystem(format!("无法读取文件信息：{}", e)))?;
    validate_input_size(metadata.len(), config)?;

    std::fs::read(file_path).map_err(|e| MediaError::FileSystem(format!("无法读取媒体文件：{}", e)))
}

fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, MediaError> {
    let len = base64_data.trim().len() as u64;
    let groups = len
        .checked_add(3)
        .ok_or_else(|| MediaError::ResourceLimit("Base64 输入长度溢出".to_string()))?
        / 4;

    groups
        .checked_mul(3)
        .ok_or_else(|| MediaError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
}

fn parse_base64_with_limit(data: &str, max_input_bytes: u64) -> Result<Vec<u8>, MediaError> {
    let normalized = data.trim();

    let payload = if normalized.starts_with("data:") {
        let base64_start = normalized
            .find(";base64,")
            .ok_or_else(|| MediaError::UnsupportedMedia("缺少 base64 标记".to_string()))?;
        &normalized[base64_start + 8..]
    } else {
        normalized
    };

    let estimated_len = estimate_base64_decoded_upper_bound_len(payload)?;
    if estimated_len > max_input_bytes {
        return Err(MediaError::ResourceLimit(format!(
            "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
            estimated_len as f64 / 1024.0 / 1024.0,
            max_input_bytes as f64 / 1024.0 / 1024.0
        )));
    }

    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| MediaError::UnsupportedMedia(format!("Base64 解码失败：{}", e)))
}
