// 端到端：外部入口 → 适配负载，按设备能解析的格式验证输出
use std::io::Cursor;

use dotmatrix_media::device::SharedDeviceState;
use dotmatrix_media::error::AppError;
use dotmatrix_media::media::{
    ANIMATION_BUDGET, AdaptRequest, AdaptedMedia, MediaError, MediaKind, MediaService, MediaSource,
};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

fn still_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 90]));
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut cursor, format)
        .expect("failed to encode still");
    cursor.into_inner()
}

fn gif_bytes(width: u32, height: u32, durations_ms: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        encoder.set_repeat(Repeat::Infinite).expect("set repeat");
        for (i, duration) in durations_ms.iter().enumerate() {
            let shade = (i * 4 % 256) as u8;
            let image = RgbaImage::from_fn(width, height, |x, _| Rgba([shade, (x * 9 % 256) as u8, 40, 255]));
            let frame = Frame::from_parts(image, 0, 0, Delay::from_numer_denom_ms(*duration, 1));
            encoder.encode_frame(frame).expect("encode frame");
        }
    }
    out
}

struct DecodedGif {
    width: u16,
    height: u16,
    delays_cs: Vec<u16>,
    rgba_frames: Vec<Vec<u8>>,
    infinite_loop: bool,
}

fn decode_output(bytes: &[u8]) -> DecodedGif {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options.read_info(Cursor::new(bytes)).expect("output should be a valid gif");

    let mut delays_cs = Vec::new();
    let mut rgba_frames = Vec::new();
    while let Some(frame) = decoder.read_next_frame().expect("frame should decode") {
        assert_eq!(frame.dispose, gif::DisposalMethod::Background);
        delays_cs.push(frame.delay);
        rgba_frames.push(frame.buffer.to_vec());
    }

    DecodedGif {
        width: decoder.width(),
        height: decoder.height(),
        delays_cs,
        rgba_frames,
        infinite_loop: decoder.repeat() == gif::Repeat::Infinite,
    }
}

fn request(mode: &str) -> AdaptRequest {
    AdaptRequest {
        mode: mode.to_string(),
        ..AdaptRequest::default()
    }
}

#[test]
fn still_output_length_matches_canvas_for_every_mode() {
    let service = MediaService::new();
    for size in [16_i64, 32, 64] {
        let device = SharedDeviceState::new(size);
        for mode in ["fit", "fill", "stretch", "unknown"] {
            let adapted = service
                .prepare(MediaSource::Bytes(still_bytes(123, 47, ImageFormat::Png)), &request(mode), &device)
                .expect("still should adapt");
            assert_eq!(adapted.kind(), MediaKind::Still);
            assert_eq!(adapted.payload().len(), (size * size * 3) as usize, "mode={mode} size={size}");
        }
    }
}

#[test]
fn jpeg_landscape_fill_produces_64_square_rgb() {
    let service = MediaService::new();
    let device = SharedDeviceState::new(64);

    let adapted = service
        .prepare(MediaSource::Bytes(still_bytes(400, 300, ImageFormat::Jpeg)), &request("fill"), &device)
        .expect("jpeg should adapt");

    assert_eq!(adapted.payload().len(), 12288);
}

#[test]
fn short_gif_passes_through_budget_unchanged() {
    let service = MediaService::new();
    let device = SharedDeviceState::new(32);

    let adapted = service
        .prepare(MediaSource::Bytes(gif_bytes(48, 48, &[100; 20])), &AdaptRequest::default(), &device)
        .expect("gif should adapt");

    let AdaptedMedia::Animation(animation) = adapted else {
        panic!("gif input should take the animation path");
    };
    assert_eq!(animation.frame_count, 20);

    let decoded = decode_output(&animation.encoded_gif_bytes);
    assert_eq!((decoded.width, decoded.height), (32, 32));
    assert_eq!(decoded.delays_cs, vec![10; 20]);
    assert!(decoded.infinite_loop);
}

#[test]
fn long_gif_is_sampled_to_duration_cap() {
    let service = MediaService::new();
    let device = SharedDeviceState::new(16);

    let adapted = service
        .prepare(MediaSource::Bytes(gif_bytes(20, 20, &[50; 64])), &AdaptRequest::default(), &device)
        .expect("gif should adapt");

    let decoded = decode_output(adapted.payload());
    assert_eq!(decoded.delays_cs.len(), 40);
    let total_ms: u32 = decoded.delays_cs.iter().map(|cs| u32::from(*cs) * 10).sum();
    assert!(total_ms <= ANIMATION_BUDGET.max_total_duration_ms as u32);
}

#[test]
fn fit_mode_letterboxes_gif_frames_with_black() {
    let service = MediaService::new();
    let device = SharedDeviceState::new(16);

    let adapted = service
        .prepare(MediaSource::Bytes(gif_bytes(40, 10, &[100; 3])), &request("fit"), &device)
        .expect("gif should adapt");

    let decoded = decode_output(adapted.payload());
    for frame in &decoded.rgba_frames {
        assert_eq!(frame.len(), 16 * 16 * 4);
        assert_eq!(&frame[0..3], &[0, 0, 0], "top-left lies in the letterbox");
        let last = frame.len() - 4;
        assert_eq!(&frame[last..last + 3], &[0, 0, 0], "bottom-right lies in the letterbox");
    }
}

#[test]
fn non_positive_canvas_is_invalid_parameter() {
    let service = MediaService::new();
    for size in [0_i64, -64] {
        let device = SharedDeviceState::new(size);
        let result = service.prepare(
            MediaSource::Bytes(still_bytes(8, 8, ImageFormat::Png)),
            &AdaptRequest::default(),
            &device,
        );
        assert!(matches!(result, Err(AppError::Media(MediaError::InvalidParameter(_)))));
    }
}

#[test]
fn corrupt_gif_is_unsupported_media() {
    let service = MediaService::new();
    let device = SharedDeviceState::new(32);

    let mut truncated = gif_bytes(10, 10, &[100; 2]);
    truncated.truncate(12);

    let result = service.prepare(MediaSource::Bytes(truncated), &AdaptRequest::default(), &device);
    assert!(matches!(result, Err(AppError::Media(MediaError::UnsupportedMedia(_)))));
}
