//! # 静态图适配器
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸，按像素/内存上限快速拒绝
//! 2. 完整解码，并按 EXIF 方向信息摆正
//! 3. 转为 RGB（设备无法显示 alpha）
//! 4. 按 `CanvasSpec` 执行 Fill / Fit / Stretch
//! 5. 输出 `size * size * 3` 字节的扁平 RGB 缓冲

use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use std::io::Cursor;

use super::geometry::Placement;
use super::limits::{validate_decoded_memory_limits, validate_pixel_limits};
use super::resample::resize_rgb;
use super::{AdaptedStill, CanvasSpec, MediaConfig, MediaError};

/// 解码并适配一张静态图片。
pub(crate) fn adapt_still(
    bytes: &[u8],
    spec: &CanvasSpec,
    config: &MediaConfig,
) -> Result<AdaptedStill, MediaError> {
    let decoded = decode_oriented(bytes, config)?;
    let (src_width, src_height) = (decoded.width(), decoded.height());

    let rgb = decoded.to_rgb8();
    let canvas = place_on_canvas(rgb, spec, config);
    let rgb_bytes = canvas.into_raw();

    if rgb_bytes.len() != spec.rgb_len() {
        return Err(MediaError::Encode("适配后像素数据长度异常".to_string()));
    }

    log::info!(
        "🖼️ 静态图适配完成 - 原始尺寸: {}x{} 画布: {}x{} 模式: {} 锚点: ({:.2}, {:.2})",
        src_width,
        src_height,
        spec.size(),
        spec.size(),
        spec.mode().as_str(),
        spec.crop_anchor().x(),
        spec.crop_anchor().y()
    );

    Ok(AdaptedStill {
        canvas: *spec,
        rgb_bytes,
    })
}

/// 解码并应用嵌入的方向元数据。
fn decode_oriented(bytes: &[u8], config: &MediaConfig) -> Result<DynamicImage, MediaError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| MediaError::UnsupportedMedia(format!("无法识别图片格式：{}", e)))?;

    let mut decoder = reader
        .into_decoder()
        .map_err(|e| MediaError::UnsupportedMedia(format!("无法创建图片解码器：{}", e)))?;

    let (header_width, header_height) = decoder.dimensions();
    validate_pixel_limits(config, header_width, header_height)?;
    validate_decoded_memory_limits(config, header_width, header_height)?;

    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

    let mut image = DynamicImage::from_decoder(decoder)
        .map_err(|e| MediaError::UnsupportedMedia(format!("图片解码失败：{}", e)))?;
    image.apply_orientation(orientation);

    Ok(image)
}

/// 按几何方案把 RGB 图像映射到正方形画布。
///
/// `Fill` 的裁剪窗口直接交给重采样器，输出即为画布，不经过放大后的整图。
fn place_on_canvas(rgb: RgbImage, spec: &CanvasSpec, config: &MediaConfig) -> RgbImage {
    let size = spec.size();
    let placement = Placement::plan(rgb.width(), rgb.height(), spec);
    let resized = resize_rgb(
        rgb,
        placement.source_window,
        placement.target_width,
        placement.target_height,
        config.still_filter,
    );

    if resized.dimensions() == (size, size) {
        return resized;
    }

    let mut background = RgbImage::new(size, size);
    let (x, y) = placement.paste_offset;
    image::imageops::replace(&mut background, &resized, i64::from(x), i64::from(y));
    background
}
