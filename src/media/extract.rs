//! # 动图帧提取
//!
//! 把 GIF 容器解码为有序的 `(完整合成帧, 时长)` 序列。
//! `image` 的 GIF 解码器已按处置方式把子矩形补丁合成到完整画布，
//! 下游阶段始终看到完整帧。
//!
//! 任何解码错误（截断、格式损坏）都会让整次提取失败，不返回部分帧。

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, Delay, ImageDecoder};
use std::io::Cursor;

use super::config::DEFAULT_FRAME_DURATION_MS;
use super::limits::{rgba_bytes, validate_accumulated_bytes, validate_pixel_limits};
use super::{AnimationFrame, MediaConfig, MediaError, PixelFrame};

/// 解码 GIF 字节为完整帧序列。
pub(crate) fn extract_frames(bytes: &[u8], config: &MediaConfig) -> Result<Vec<AnimationFrame>, MediaError> {
    let decoder = GifDecoder::new(Cursor::new(bytes))
        .map_err(|e| MediaError::UnsupportedMedia(format!("GIF 解码器初始化失败：{}", e)))?;

    let (width, height) = decoder.dimensions();
    if width == 0 || height == 0 {
        return Err(MediaError::UnsupportedMedia(format!("GIF 逻辑屏幕尺寸为空：{}x{}", width, height)));
    }
    validate_pixel_limits(config, width, height)?;
    let bytes_per_frame = rgba_bytes(width, height)?;

    let mut frames = Vec::new();
    let mut decoded_bytes = 0u64;

    for frame in decoder.into_frames() {
        let frame = frame.map_err(|e| MediaError::UnsupportedMedia(format!("GIF 帧解码失败：{}", e)))?;

        decoded_bytes = decoded_bytes.saturating_add(bytes_per_frame);
        validate_accumulated_bytes(config, decoded_bytes)?;

        let duration_ms = normalize_duration(frame.delay());
        frames.push(AnimationFrame {
            frame: PixelFrame::from_rgba_image(frame.into_buffer()),
            duration_ms,
        });
    }

    if frames.is_empty() {
        return Err(MediaError::UnsupportedMedia("GIF 不包含任何帧".to_string()));
    }

    log::info!(
        "🎞️ GIF 提取完成 - 尺寸: {}x{} 帧数: {} 总时长: {}ms",
        width,
        height,
        frames.len(),
        frames.iter().map(|f| u64::from(f.duration_ms)).sum::<u64>()
    );

    Ok(frames)
}

/// 部分编码器用 0 表示“使用解码器默认值”，统一归一为默认时长。
fn normalize_duration(delay: Delay) -> u32 {
    let (numer, denom) = delay.numer_denom_ms();
    let duration_ms = if denom == 0 { 0 } else { numer / denom };

    if duration_ms == 0 {
        DEFAULT_FRAME_DURATION_MS
    } else {
        duration_ms
    }
}
