//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `MediaSource` 表示外部来源语义
//! - `RawMedia` 表示已加载但未解码的字节
//! - `PixelFrame` / `AnimationFrame` / `QuantizedFrame` 为各阶段的中间结果
//! - `AdaptedStill` / `AdaptedAnimation` 为可直接交给设备传输层的终态数据
//!
//! 所有实体只存在于单次适配调用之内，阶段之间按值传递，不共享可变状态。

use super::{CanvasSpec, MediaError};

/// 媒体输入来源。
pub enum MediaSource {
    /// 内存中的原始字节（例如 HTTP 上传体）。
    Bytes(Vec<u8>),
    /// Base64（支持 Data URL 与纯 Base64 字符串）。
    Base64(String),
    /// 本地文件路径来源。
    FilePath(String),
}

/// 已识别的媒体类别，决定走静态图还是动图链路。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Still,
    Animation,
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawMedia {
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
    pub(crate) kind: MediaKind,
}

/// 像素通道布局。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Rgb,
    Rgba,
}

impl ChannelLayout {
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// 一帧像素数据，缓冲长度恒等于 `width * height * channels`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelFrame {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    pixels: Vec<u8>,
}

impl PixelFrame {
    pub fn new(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        pixels: Vec<u8>,
    ) -> Result<Self, MediaError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(layout.channels()))
            .ok_or_else(|| MediaError::ResourceLimit("帧尺寸导致内存溢出风险".to_string()))?;

        if pixels.len() != expected {
            return Err(MediaError::InvalidParameter(format!(
                "像素缓冲长度 {} 与 {}x{}x{} 不符",
                pixels.len(),
                width,
                height,
                layout.channels()
            )));
        }

        Ok(Self {
            width,
            height,
            layout,
            pixels,
        })
    }

    pub(crate) fn from_rgba_image(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            layout: ChannelLayout::Rgba,
            pixels: image.into_raw(),
        }
    }

    /// 转为 RGBA 图像缓冲（RGB 帧补不透明 alpha）。
    pub(crate) fn into_rgba_image(self) -> image::RgbaImage {
        let (width, height) = (self.width, self.height);
        let pixels = match self.layout {
            ChannelLayout::Rgba => self.pixels,
            ChannelLayout::Rgb => self
                .pixels
                .chunks_exact(3)
                .flat_map(|px| [px[0], px[1], px[2], u8::MAX])
                .collect(),
        };

        match image::RgbaImage::from_raw(width, height, pixels) {
            Some(image) => image,
            // 构造时已保证长度一致。
            None => image::RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// 动图中的一帧及其显示时长。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationFrame {
    pub frame: PixelFrame,
    /// 恒大于 0。
    pub duration_ms: u32,
}

/// 量化后的索引色帧。
///
/// `indexed_pixels` 中每个索引都小于 `palette.len()`，调色板最多 256 色。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizedFrame {
    pub width: u32,
    pub height: u32,
    pub indexed_pixels: Vec<u8>,
    pub palette: Vec<[u8; 3]>,
    pub duration_ms: u32,
}

/// 静态图链路终态：`size * size * 3` 字节的 RGB。
#[derive(Debug, Clone)]
pub struct AdaptedStill {
    pub canvas: CanvasSpec,
    pub rgb_bytes: Vec<u8>,
}

/// 动图链路终态：重新编码后的 GIF 字节流。
#[derive(Debug, Clone)]
pub struct AdaptedAnimation {
    pub canvas: CanvasSpec,
    pub encoded_gif_bytes: Vec<u8>,
    /// 预算后实际编码的帧数（诊断用）。
    pub frame_count: usize,
}

/// 自动分派后的适配结果。
#[derive(Debug, Clone)]
pub enum AdaptedMedia {
    Still(AdaptedStill),
    Animation(AdaptedAnimation),
}

impl AdaptedMedia {
    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Still(_) => MediaKind::Still,
            Self::Animation(_) => MediaKind::Animation,
        }
    }

    /// 交给传输层的负载字节。
    pub fn payload(&self) -> &[u8] {
        match self {
            Self::Still(still) => &still.rgb_bytes,
            Self::Animation(animation) => &animation.encoded_gif_bytes,
        }
    }
}
