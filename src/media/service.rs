//! # 服务层
//!
//! ## 设计思路
//!
//! `MediaService` 是外层（HTTP 上传、CLI）调用的唯一入口：
//! 1. 从 `DeviceState` 读取画布尺寸并解析 `CanvasSpec`
//! 2. 在 tokio 阻塞线程池中执行同步流水线，不阻塞异步运行时
//! 3. 把结果交给 `DeviceTransport`
//!
//! 多个上传请求可以并行执行：除只读为主的配置外，请求之间没有共享可变状态。
//! 流水线本身不可取消，要么返回完整结果，要么整体失败。

use crate::device::{DeviceState, DeviceTransport};
use crate::error::AppError;

use super::config::MediaAdvancedConfig;
use super::{
    AdaptedMedia, CanvasSpec, MediaConfig, MediaError, MediaHandler, MediaPerformanceProfile, MediaSource,
};

/// 调用方对单次适配的几何请求。
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptRequest {
    /// `fit` / `fill` / `stretch`，未知值回退为 `fill`。
    pub mode: String,
    pub crop_x: f32,
    pub crop_y: f32,
}

impl Default for AdaptRequest {
    fn default() -> Self {
        Self {
            mode: "fill".to_string(),
            crop_x: 0.5,
            crop_y: 0.5,
        }
    }
}

/// 媒体适配服务。
#[derive(Clone)]
pub struct MediaService {
    handler: MediaHandler,
}

impl Default for MediaService {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaService {
    /// 使用默认配置创建服务。
    pub fn new() -> Self {
        Self::with_config(MediaConfig::default())
    }

    /// 使用自定义配置创建服务。
    ///
    /// # 示例
    /// ```rust
    /// use dotmatrix_media::media::{MediaConfig, MediaService};
    ///
    /// let mut config = MediaConfig::default();
    /// config.max_palette_colors = 64;
    /// let service = MediaService::with_config(config);
    /// assert_eq!(service.get_advanced_config()?.max_palette_colors, 64);
    /// # Ok::<(), dotmatrix_media::media::MediaError>(())
    /// ```
    pub fn with_config(config: MediaConfig) -> Self {
        Self {
            handler: MediaHandler::new(config),
        }
    }

    pub fn handler(&self) -> &MediaHandler {
        &self.handler
    }

    /// 按设备当前分辨率解析画布规格。
    pub fn resolve_canvas(
        &self,
        request: &AdaptRequest,
        device: &dyn DeviceState,
    ) -> Result<CanvasSpec, MediaError> {
        CanvasSpec::resolve(&request.mode, request.crop_x, request.crop_y, device.canvas_size())
    }

    /// 同步执行完整适配，不发送。
    pub fn prepare(
        &self,
        source: MediaSource,
        request: &AdaptRequest,
        device: &dyn DeviceState,
    ) -> Result<AdaptedMedia, AppError> {
        let spec = self.resolve_canvas(request, device)?;
        Ok(self.handler.adapt(source, &spec)?)
    }

    /// 适配并发送到设备。
    ///
    /// CPU 密集的流水线在阻塞线程池执行，发送在适配完整成功之后才会发生。
    pub async fn upload(
        &self,
        source: MediaSource,
        request: &AdaptRequest,
        device: &dyn DeviceState,
        transport: &dyn DeviceTransport,
    ) -> Result<AdaptedMedia, AppError> {
        let spec = self.resolve_canvas(request, device)?;
        let handler = self.handler.clone();

        let adapted = tokio::task::spawn_blocking(move || handler.adapt(source, &spec))
            .await
            .map_err(|e| AppError::Task(e.to_string()))?
            .inspect_err(|err| {
                log::warn!("⚠️ 媒体适配失败 [{}@{}]：{}", err.code(), err.stage(), err);
            })?;

        match &adapted {
            AdaptedMedia::Still(still) => transport.send_raw_pixels(&still.rgb_bytes)?,
            AdaptedMedia::Animation(animation) => transport.send_animation(&animation.encoded_gif_bytes)?,
        }

        log::info!(
            "📤 已发送到设备 - 类别: {:?} 负载: {} 字节",
            adapted.kind(),
            adapted.payload().len()
        );

        Ok(adapted)
    }

    /// 设置性能档位。
    pub fn set_performance_profile(&self, profile: &str) -> Result<(), MediaError> {
        let profile = MediaPerformanceProfile::from_str(profile)?;
        self.handler.set_performance_profile(profile)
    }

    /// 获取当前生效性能档位（字符串）。
    pub fn get_performance_profile(&self) -> Result<String, MediaError> {
        let profile = self.handler.get_performance_profile()?;
        Ok(profile.as_str().to_string())
    }

    pub fn set_advanced_config(&self, config: MediaAdvancedConfig) -> Result<(), MediaError> {
        self.handler.set_advanced_config(&config)
    }

    pub fn get_advanced_config(&self) -> Result<MediaAdvancedConfig, MediaError> {
        self.handler.get_advanced_config()
    }

    /// 从 JSON 文本应用高级配置。
    pub fn apply_settings_json(&self, json: &str) -> Result<(), MediaError> {
        self.set_advanced_config(MediaAdvancedConfig::from_json_str(json)?)
    }
}
