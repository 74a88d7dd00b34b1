use std::path::PathBuf;
use std::process::Command;

use media_ffmpeg::{StreamKind, decode_image_scaled, decode_video_frame_near_seconds, probe_media};

fn temp_output(extension: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "media-canvas-{}-{}.{extension}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system clock must be after unix epoch")
            .as_nanos()
    ))
}

fn run_ffmpeg(args: &[&str], output: &PathBuf) {
    let status = Command::new("ffmpeg")
        .args(["-y", "-v", "error"])
        .args(args)
        .arg(output)
        .output()
        .expect("ffmpeg must be installed to run tests");

    assert!(
        status.status.success(),
        "ffmpeg command must succeed: {}",
        String::from_utf8_lossy(&status.stderr)
    );
}

fn make_sample_video() -> PathBuf {
    let output = temp_output("mp4");
    run_ffmpeg(
        &[
            "-f",
            "lavfi",
            "-i",
            "testsrc=size=160x90:rate=30",
            "-f",
            "lavfi",
            "-i",
            "sine=frequency=440:sample_rate=48000",
            "-t",
            "1.2",
            "-pix_fmt",
            "yuv420p",
        ],
        &output,
    );
    output
}

fn make_sample_image() -> PathBuf {
    let output = temp_output("png");
    run_ffmpeg(
        &["-f", "lavfi", "-i", "testsrc=size=64x48", "-frames:v", "1"],
        &output,
    );
    output
}

#[test]
fn probe_media_reports_video_and_audio_streams() {
    let sample = make_sample_video();

    let info = probe_media(&sample).expect("probe should succeed");

    assert_eq!(info.streams.len(), 2);
    assert_eq!(info.video_dimensions(), Some((160, 90)));
    assert!(
        info.streams
            .iter()
            .any(|stream| stream.kind == StreamKind::Audio)
    );
    let duration = info.duration_seconds.expect("video has a duration");
    assert!((duration - 1.2).abs() < 0.1);
}

#[test]
fn probe_media_reports_still_image_as_single_video_stream() {
    let sample = make_sample_image();

    let info = probe_media(&sample).expect("probe should succeed");

    assert_eq!(info.streams.len(), 1);
    assert_eq!(info.video_dimensions(), Some((64, 48)));
}

#[test]
fn decode_image_scaled_ignores_source_aspect_ratio() {
    let sample = make_sample_image();

    let frame = decode_image_scaled(&sample, 30, 90).expect("decode should succeed");

    assert_eq!(frame.width, 30);
    assert_eq!(frame.height, 90);
    assert_eq!(frame.rgba.len(), 30 * 90 * 4);
}

#[test]
fn decode_video_frame_near_seconds_returns_native_size_frame() {
    let sample = make_sample_video();

    let frame = decode_video_frame_near_seconds(&sample, 0.5).expect("decode should succeed");

    assert_eq!(frame.width, 160);
    assert_eq!(frame.height, 90);
    assert_eq!(frame.rgba.len(), 160 * 90 * 4);
}

#[test]
fn decode_image_scaled_fails_for_non_media_file() {
    let garbage = temp_output("png");
    std::fs::write(&garbage, b"definitely not a png").expect("write garbage file");

    assert!(decode_image_scaled(&garbage, 10, 10).is_err());
}
