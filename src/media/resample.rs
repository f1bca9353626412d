//! # 重采样
//!
//! 优先使用 `fast_image_resize`（SIMD 卷积 / 最近邻），
//! 失败时回退 `image::imageops::resize`，两条路径输出尺寸与滤镜语义一致。
//!
//! 可选的 `SourceWindow` 让重采样器只读取源图的一部分并直接输出目标尺寸，
//! 裁剪与缩放合并为一步，不产生放大后的整图缓冲。

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{ImageBuffer, Pixel, RgbImage, RgbaImage};

use super::MediaError;
use super::geometry::SourceWindow;

/// 静态图：RGB 高质量缩放。
pub(crate) fn resize_rgb(
    image: RgbImage,
    window: Option<SourceWindow>,
    width: u32,
    height: u32,
    filter: FilterType,
) -> RgbImage {
    if window.is_none() && image.dimensions() == (width, height) {
        return image;
    }

    match resize_with_fast_image_resize(&image, window, width, height, fr::PixelType::U8x3, to_fast_alg(filter)) {
        Ok(resized) => resized,
        Err(err) => {
            log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::resize：{}", err);
            resize_with_image(&image, window, width, height, filter)
        }
    }
}

/// 动图帧：RGBA 最近邻缩放，保持像素画边缘锐利。
pub(crate) fn resize_rgba_nearest(
    image: RgbaImage,
    window: Option<SourceWindow>,
    width: u32,
    height: u32,
) -> RgbaImage {
    if window.is_none() && image.dimensions() == (width, height) {
        return image;
    }

    match resize_with_fast_image_resize(&image, window, width, height, fr::PixelType::U8x4, fr::ResizeAlg::Nearest)
    {
        Ok(resized) => resized,
        Err(err) => {
            log::warn!("⚠️ fast_image_resize 最近邻缩放失败，回退 image::resize：{}", err);
            resize_with_image(&image, window, width, height, FilterType::Nearest)
        }
    }
}

fn resize_with_fast_image_resize<P>(
    image: &ImageBuffer<P, Vec<u8>>,
    window: Option<SourceWindow>,
    target_width: u32,
    target_height: u32,
    pixel_type: fr::PixelType,
    alg: fr::ResizeAlg,
) -> Result<ImageBuffer<P, Vec<u8>>, MediaError>
where
    P: Pixel<Subpixel = u8>,
{
    let (src_width, src_height) = image.dimensions();

    // 借用源缓冲，不复制整张源图。
    let src_image = fr::images::ImageRef::new(src_width, src_height, image.as_raw(), pixel_type)
        .map_err(|e| MediaError::Encode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, pixel_type);

    let mut resizer = fr::Resizer::new();
    let mut options = fr::ResizeOptions::new().resize_alg(alg);
    if let Some(window) = window {
        options = options.crop(window.left, window.top, window.width, window.height);
    }

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| MediaError::Encode(format!("fast_image_resize 执行失败：{}", e)))?;

    ImageBuffer::<P, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| MediaError::Encode("fast_image_resize 输出缓冲长度异常".to_string()))
}

/// 回退路径：先按整数像素裁剪窗口，再缩放。
fn resize_with_image<P>(
    image: &ImageBuffer<P, Vec<u8>>,
    window: Option<SourceWindow>,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    match window {
        Some(window) => {
            let (left, top, width, height) = window.pixel_rect(image.width(), image.height());
            let cropped = image::imageops::crop_imm(image, left, top, width, height).to_image();
            image::imageops::resize(&cropped, target_width, target_height, filter)
        }
        None => image::imageops::resize(image, target_width, target_height, filter),
    }
}

/// `image` 滤镜到 `fast_image_resize` 算法的映射，与回退路径语义保持一致。
fn to_fast_alg(filter: FilterType) -> fr::ResizeAlg {
    match filter {
        FilterType::Nearest => fr::ResizeAlg::Nearest,
        FilterType::Triangle => fr::ResizeAlg::Convolution(fr::FilterType::Bilinear),
        FilterType::CatmullRom => fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom),
        FilterType::Gaussian => fr::ResizeAlg::Convolution(fr::FilterType::Gaussian),
        FilterType::Lanczos3 => fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3),
    }
}
