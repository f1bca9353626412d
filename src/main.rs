//! # 点阵屏媒体适配 — 命令行入口
//!
//! 离线执行一次完整适配，把结果写入文件，便于在没有设备时检查输出。
//!
//! ```text
//! dotmatrix-media <input> <output> [fit|fill|stretch] [crop_x] [crop_y]
//! ```
//!
//! 环境变量：
//! - `DOTMATRIX_SCREEN_SIZE`：设备分辨率，默认 64
//! - `DOTMATRIX_MEDIA_CONFIG`：高级配置 JSON 文件路径
//! - `DOTMATRIX_MEDIA_PROFILE`：性能档位（quality / balanced / speed）

use std::process::ExitCode;

use dotmatrix_media::device::SharedDeviceState;
use dotmatrix_media::error::AppError;
use dotmatrix_media::media::{AdaptRequest, AdaptedMedia, MediaError, MediaService, MediaSource};

const DEFAULT_SCREEN_SIZE: i64 = 64;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("❌ 适配失败: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), AppError> {
    let [input, output, rest @ ..] = args.as_slice() else {
        return Err(invalid("用法: dotmatrix-media <input> <output> [fit|fill|stretch] [crop_x] [crop_y]"));
    };

    let request = AdaptRequest {
        mode: rest.first().cloned().unwrap_or_else(|| AdaptRequest::default().mode),
        crop_x: parse_anchor(rest.get(1), "crop_x")?,
        crop_y: parse_anchor(rest.get(2), "crop_y")?,
    };

    let service = build_service()?;
    let device = SharedDeviceState::new(screen_size_from_env()?);

    let adapted = service.prepare(MediaSource::FilePath(input.clone()), &request, &device)?;
    std::fs::write(output, adapted.payload())
        .map_err(|e| MediaError::FileSystem(format!("写入输出失败：{}", e)))?;

    match &adapted {
        AdaptedMedia::Still(still) => log::info!(
            "💾 已写入 {} 字节 RGB（{}x{}）→ {}",
            still.rgb_bytes.len(),
            still.canvas.size(),
            still.canvas.size(),
            output
        ),
        AdaptedMedia::Animation(animation) => log::info!(
            "💾 已写入 GIF：{} 帧，{} 字节 → {}",
            animation.frame_count,
            animation.encoded_gif_bytes.len(),
            output
        ),
    }

    Ok(())
}

fn build_service() -> Result<MediaService, AppError> {
    let service = MediaService::new();

    if let Ok(path) = std::env::var("DOTMATRIX_MEDIA_CONFIG") {
        let json = std::fs::read_to_string(&path)
            .map_err(|e| MediaError::FileSystem(format!("无法读取配置文件 {}：{}", path, e)))?;
        service.apply_settings_json(&json)?;
        log::info!("⚙️ 已加载高级配置：{}", path);
    }

    if let Ok(profile) = std::env::var("DOTMATRIX_MEDIA_PROFILE") {
        service.set_performance_profile(&profile)?;
    }

    Ok(service)
}

fn screen_size_from_env() -> Result<i64, AppError> {
    match std::env::var("DOTMATRIX_SCREEN_SIZE") {
        Ok(value) => value
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(&format!("DOTMATRIX_SCREEN_SIZE 不是整数：{}", value))),
        Err(_) => Ok(DEFAULT_SCREEN_SIZE),
    }
}

fn parse_anchor(value: Option<&String>, name: &str) -> Result<f32, AppError> {
    match value {
        Some(raw) => raw
            .parse::<f32>()
            .map_err(|_| invalid(&format!("{} 不是数字：{}", name, raw))),
        None => Ok(0.5),
    }
}

fn invalid(message: &str) -> AppError {
    AppError::Media(MediaError::InvalidParameter(message.to_string()))
}
