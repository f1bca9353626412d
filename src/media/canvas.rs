//! # 画布规格解析
//!
//! 把调用方给出的缩放模式字符串与裁剪锚点，结合设备分辨率，
//! 解析为一次适配调用内不可变的 `CanvasSpec`。
//!
//! 未知模式回退为 `Fill`（显示连续性优先于严格校验），
//! 越界锚点被钳制到 `[0, 1]`。只有画布尺寸非法才会拒绝请求。

use super::MediaError;

/// GIF 逻辑屏幕宽高为 16 位。
pub const MAX_CANVAS_SIZE: u32 = u16::MAX as u32;

/// 几何映射策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
    /// 等比缩放并完整放入画布，不足处以黑色填充。
    Fit,
    /// 等比缩放至覆盖画布，再按锚点裁剪。
    #[default]
    Fill,
    /// 两轴独立拉伸到画布尺寸。
    Stretch,
}

impl ResizeMode {
    /// 宽松解析：未知值回退为 `Fill`。
    pub fn parse_lenient(mode: &str) -> Self {
        match mode.trim().to_lowercase().as_str() {
            "fit" => Self::Fit,
            "fill" => Self::Fill,
            "stretch" => Self::Stretch,
            other => {
                log::warn!("⚠️ 未知缩放模式 {:?}，回退为 fill", other);
                Self::Fill
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fit => "fit",
            Self::Fill => "fill",
            Self::Stretch => "stretch",
        }
    }
}

/// 裁剪锚点，两个分量均位于 `[0, 1]`。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropAnchor {
    x: f32,
    y: f32,
}

impl CropAnchor {
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };

    /// 钳制到 `[0, 1]`；非有限值按居中处理。
    pub fn clamped(x: f32, y: f32) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }
}

impl Default for CropAnchor {
    fn default() -> Self {
        Self::CENTER
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        return 0.5;
    }
    value.clamp(0.0, 1.0)
}

/// 单次适配调用的几何策略。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSpec {
    size: u32,
    mode: ResizeMode,
    crop_anchor: CropAnchor,
}

impl CanvasSpec {
    /// 直接构造（尺寸必须合法）。
    pub fn new(size: u32, mode: ResizeMode, crop_anchor: CropAnchor) -> Result<Self, MediaError> {
        validate_canvas_size(i64::from(size))?;
        Ok(Self {
            size,
            mode,
            crop_anchor,
        })
    }

    /// 由调用方原始输入解析。
    ///
    /// # 示例
    /// ```rust
    /// use dotmatrix_media::media::{CanvasSpec, ResizeMode};
    ///
    /// let spec = CanvasSpec::resolve("zoom", 1.7, -0.2, 32)?;
    /// assert_eq!(spec.mode(), ResizeMode::Fill);
    /// assert_eq!(spec.crop_anchor().x(), 1.0);
    /// assert_eq!(spec.crop_anchor().y(), 0.0);
    /// # Ok::<(), dotmatrix_media::media::MediaError>(())
    /// ```
    pub fn resolve(
        requested_mode: &str,
        crop_x: f32,
        crop_y: f32,
        canvas_size: i64,
    ) -> Result<Self, MediaError> {
        let size = validate_canvas_size(canvas_size)?;
        Ok(Self {
            size,
            mode: ResizeMode::parse_lenient(requested_mode),
            crop_anchor: CropAnchor::clamped(crop_x, crop_y),
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn mode(&self) -> ResizeMode {
        self.mode
    }

    /// 仅在 `Fill` 模式下有意义，其余模式忽略。
    pub fn crop_anchor(&self) -> CropAnchor {
        self.crop_anchor
    }

    /// 输出 RGB 缓冲应有的字节数。
    pub fn rgb_len(&self) -> usize {
        self.size as usize * self.size as usize * 3
    }
}

fn validate_canvas_size(canvas_size: i64) -> Result<u32, MediaError> {
    if canvas_size <= 0 || canvas_size > i64::from(MAX_CANVAS_SIZE) {
        log::error!(
            "❌ 设备画布尺寸异常：{}（合法范围 1~{}），请检查设备状态",
            canvas_size,
            MAX_CANVAS_SIZE
        );
        return Err(MediaError::InvalidParameter(format!(
            "画布尺寸非法：{}",
            canvas_size
        )));
    }
    Ok(canvas_size as u32)
}
