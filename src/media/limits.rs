//! 解码前的资源上限校验。
//!
//! 优先做尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。

use super::{MediaConfig, MediaError};

/// 校验像素数量是否超过配置上限。
pub(crate) fn validate_pixel_limits(
    config: &MediaConfig,
    width: u32,
    height: u32,
) -> Result<(), MediaError> {
    let pixels = u64::from(width)
        .checked_mul(u64::from(height))
        .ok_or_else(|| MediaError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > config.max_decoded_pixels {
        return Err(MediaError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}

pub(crate) fn validate_decoded_memory_limits(
    config: &MediaConfig,
    width: u32,
    height: u32,
) -> Result<(), MediaError> {
    let estimated = rgba_bytes(width, height)?;
    validate_accumulated_bytes(config, estimated)
}

/// 按 RGBA 估算解码后字节数。
pub(crate) fn rgba_bytes(width: u32, height: u32) -> Result<u64, MediaError> {
    u64::from(width)
        .checked_mul(u64::from(height))
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| MediaError::ResourceLimit("图片解码内存估算溢出".to_string()))
}

/// 校验（可能是多帧累计的）解码字节数。
pub(crate) fn validate_accumulated_bytes(config: &MediaConfig, estimated: u64) -> Result<(), MediaError> {
    if estimated > config.max_decoded_bytes {
        return Err(MediaError::ResourceLimit(format!(
            "解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
            estimated as f64 / 1024.0 / 1024.0,
            config.max_decoded_bytes as f64 / 1024.0 / 1024.0
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_limit_is_inclusive() {
        let mut config = MediaConfig::default();
        config.max_decoded_pixels = 100;

        assert!(validate_pixel_limits(&config, 10, 10).is_ok());
        assert!(matches!(
            validate_pixel_limits(&config, 10, 11),
            Err(MediaError::ResourceLimit(_))
        ));
    }

    #[test]
    fn memory_limit_uses_rgba_estimate() {
        let mut config = MediaConfig::default();
        config.max_decoded_bytes = 400;

        assert!(validate_decoded_memory_limits(&config, 10, 10).is_ok());
        assert!(matches!(
            validate_decoded_memory_limits(&config, 11, 10),
            Err(MediaError::ResourceLimit(_))
        ));
    }
}
