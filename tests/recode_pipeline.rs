//! End-to-end pipeline runs against real GIF fixtures.

use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::codecs::gif::GifEncoder;
use image::{Delay, Frame, Rgba, RgbaImage};

use recode_quality::core::FnObserver;
use recode_quality::{
    BatchConfig, BatchProcessor, GifWebpCodec, Progress, QualityCriteria, QualityGrade,
    RecodePipeline, TaskStatus,
};

fn write_test_gif(path: &Path, frames: u32) {
    let file = File::create(path).unwrap();
    let mut encoder = GifEncoder::new(file);
    for i in 0..frames {
        let buffer = RgbaImage::from_fn(48, 32, |x, y| {
            Rgba([(x * 5) as u8, (y * 7) as u8, (i * 30) as u8, 255])
        });
        let frame = Frame::from_parts(buffer, 0, 0, Delay::from_numer_denom_ms(100, 1));
        encoder.encode_frame(frame).unwrap();
    }
}

#[tokio::test]
async fn small_gif_reencodes_lossless_with_perfect_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("anim.gif");
    write_test_gif(&input, 2);
    let output = RecodePipeline::derive_output_path(&input);

    let pipeline = RecodePipeline::new(Arc::new(GifWebpCodec::default()));
    let outcome = pipeline.run(&input, &output).await.unwrap();

    // A sub-500KiB source selects the quality strategy, which goes lossless;
    // the decoded result then matches the first frame exactly.
    assert!(outcome.optimization.parameters.lossless);
    assert!(outcome.metrics.psnr.is_infinite());
    assert_eq!(outcome.metrics.mse, 0.0);
    assert_eq!(outcome.metrics.ssim_estimate, 1.0);
    assert_eq!(outcome.metrics.grade, QualityGrade::Excellent);

    assert!(output.is_file());
    let written = std::fs::metadata(&output).unwrap().len();
    assert_eq!(written, outcome.optimized_size);
}

#[tokio::test]
async fn criteria_report_is_attached_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("anim.gif");
    write_test_gif(&input, 1);
    let output = dir.path().join("anim.webp");

    let pipeline = RecodePipeline::new(Arc::new(GifWebpCodec::default()))
        .with_criteria(QualityCriteria::default());
    let outcome = pipeline.run(&input, &output).await.unwrap();
    assert!(outcome.criteria.is_some());
}

#[tokio::test]
async fn missing_input_fails_before_touching_the_codec() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = RecodePipeline::new(Arc::new(GifWebpCodec::default()));
    let result = pipeline
        .run(dir.path().join("absent.gif"), dir.path().join("out.webp"))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn pipeline_runs_as_batch_job_over_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.gif", "b.gif", "c.gif"] {
        write_test_gif(&dir.path().join(name), 1);
    }

    let pipeline = Arc::new(RecodePipeline::new(Arc::new(GifWebpCodec::default())));
    let job = move |input: String| {
        let pipeline = Arc::clone(&pipeline);
        async move {
            let input = std::path::PathBuf::from(input);
            let output = RecodePipeline::derive_output_path(&input);
            pipeline.run(&input, &output).await
        }
    };

    let event_count = Arc::new(AtomicUsize::new(0));
    let observer = {
        let event_count = Arc::clone(&event_count);
        Arc::new(FnObserver(move |_: &Progress| {
            event_count.fetch_add(1, Ordering::SeqCst);
        }))
    };

    let processor = BatchProcessor::new(BatchConfig::new(2, false).unwrap())
        .unwrap()
        .with_observer(observer);
    let run = processor.process_directory(dir.path(), job).await.unwrap();

    // Start + one per task + complete.
    assert_eq!(event_count.load(Ordering::SeqCst), 5);
    assert_eq!(run.total_count(), 3);
    assert_eq!(run.processed_count, 3);
    assert!(run.tasks.iter().all(|t| t.status == TaskStatus::Completed));
    assert!(run.total_bytes_before > 0);
    assert!(run.savings_ratio() < 1.0);

    for task in &run.tasks {
        let metrics = task.metrics.as_ref().unwrap();
        assert_ne!(metrics.grade, QualityGrade::Error);
    }
}
