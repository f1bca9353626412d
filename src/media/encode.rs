//! # 动图重新编码
//!
//! 把量化帧序列写回单个 GIF 字节流：
//! - 无限循环；
//! - 每帧使用局部调色板（各帧独立量化，调色板互不相同）；
//! - 处置方式为“恢复背景”，每帧完整替换上一帧；
//! - 帧时长直接取自预算后的序列，以 GIF 的 1/100 秒为单位写入。

use std::borrow::Cow;

use super::{MediaError, QuantizedFrame};

/// 编码为 GIF。
pub(crate) fn encode_gif(frames: &[QuantizedFrame]) -> Result<Vec<u8>, MediaError> {
    let first = frames
        .first()
        .ok_or_else(|| MediaError::Encode("没有可编码的帧".to_string()))?;

    let width = gif_dimension(first.width)?;
    let height = gif_dimension(first.height)?;

    let mut output = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut output, width, height, &[])
            .map_err(|e| MediaError::Encode(format!("GIF 编码器初始化失败：{}", e)))?;

        encoder
            .set_repeat(gif::Repeat::Infinite)
            .map_err(|e| MediaError::Encode(format!("GIF 循环设置失败：{}", e)))?;

        for frame in frames {
            if (frame.width, frame.height) != (first.width, first.height) {
                return Err(MediaError::Encode(format!(
                    "帧尺寸不一致：{}x{}（期望 {}x{}）",
                    frame.width, frame.height, first.width, first.height
                )));
            }

            let gif_frame = gif::Frame {
                width,
                height,
                delay: duration_to_centis(frame.duration_ms),
                dispose: gif::DisposalMethod::Background,
                palette: Some(frame.palette.iter().flatten().copied().collect()),
                buffer: Cow::Borrowed(frame.indexed_pixels.as_slice()),
                ..Default::default()
            };

            encoder
                .write_frame(&gif_frame)
                .map_err(|e| MediaError::Encode(format!("GIF 帧写入失败：{}", e)))?;
        }
    }

    Ok(output)
}

/// 毫秒转 1/100 秒，四舍五入，至少 1。
fn duration_to_centis(duration_ms: u32) -> u16 {
    let centis = (duration_ms.saturating_add(5) / 10).max(1);
    u16::try_from(centis).unwrap_or(u16::MAX)
}

fn gif_dimension(value: u32) -> Result<u16, MediaError> {
    u16::try_from(value)
        .map_err(|_| MediaError::InvalidParameter(format!("GIF 尺寸超出上限：{}", value)))
}
