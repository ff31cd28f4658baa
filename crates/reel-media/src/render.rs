//! Segment rendering and scene concatenation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use reel_models::{Caption, EditSegment, VisualClip};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{build_scene_graph, graph_inputs, OUTPUT_FPS};

/// Outputs smaller than this are treated as failed renders.
pub const MIN_OUTPUT_BYTES: u64 = 10 * 1024;

/// Everything needed to render one scene segment.
#[derive(Debug)]
pub struct RenderSpec<'a> {
    pub segments: &'a [EditSegment],
    pub clips: &'a [VisualClip],
    pub captions: &'a [Caption],
    /// Narration track laid under the video
    pub audio_path: &'a Path,
    pub duration_ms: u64,
}

/// Rendering seam. The FFmpeg implementation is the production path;
/// tests substitute a stub so the pipeline can run without binaries.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render one scene to `output`. `work_dir` holds the filter
    /// script and other scratch files.
    async fn render_scene(
        &self,
        spec: RenderSpec<'_>,
        work_dir: &Path,
        output: &Path,
    ) -> MediaResult<()>;

    /// Concatenate rendered scene files into the final video without
    /// re-encoding.
    async fn concat_scenes(&self, scene_paths: &[PathBuf], output: &Path) -> MediaResult<()>;
}

/// Production renderer driving the external FFmpeg binary.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRenderer {
    /// Kill renders that run longer than this (seconds); unset means
    /// wait indefinitely
    pub timeout_secs: Option<u64>,
}

impl FfmpegRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn runner(&self) -> FfmpegRunner {
        match self.timeout_secs {
            Some(secs) => FfmpegRunner::new().with_timeout(secs),
            None => FfmpegRunner::new(),
        }
    }
}

#[async_trait]
impl Renderer for FfmpegRenderer {
    async fn render_scene(
        &self,
        spec: RenderSpec<'_>,
        work_dir: &Path,
        output: &Path,
    ) -> MediaResult<()> {
        tokio::fs::create_dir_all(work_dir).await?;

        let graph = build_scene_graph(spec.segments, spec.clips, spec.captions)?;
        let script_path = work_dir.join("filter_graph.txt");
        tokio::fs::write(&script_path, &graph).await?;
        debug!("Wrote filter graph to {}", script_path.display());

        let inputs = graph_inputs(spec.segments, spec.clips)?;
        let audio_index = inputs.len();

        let mut cmd = FfmpegCommand::new(output);
        for input in inputs {
            cmd = cmd.input(input);
        }
        let cmd = cmd
            .input(spec.audio_path)
            .filter_complex_script(&script_path)
            .map("[video_out]")
            .map(format!("{audio_index}:a"))
            .video_codec("libx264")
            .preset("medium")
            .crf(18)
            .output_args(["-r".to_string(), OUTPUT_FPS.to_string()])
            .audio_codec("aac")
            .output_args(["-b:a", "192k", "-ar", "44100", "-ac", "2"])
            .output_args(["-movflags", "+faststart"])
            .duration(spec.duration_ms as f64 / 1000.0);

        self.runner().run(&cmd).await?;
        verify_output(output).await?;

        info!(
            "Rendered segment {} ({} edit cuts, {}ms)",
            output.display(),
            spec.segments.len(),
            spec.duration_ms
        );
        Ok(())
    }

    async fn concat_scenes(&self, scene_paths: &[PathBuf], output: &Path) -> MediaResult<()> {
        if scene_paths.is_empty() {
            return Err(MediaError::Internal(
                "No scene segments to concatenate".to_string(),
            ));
        }

        // Concat demuxer list; stream copy keeps this fast and lossless
        let list_path = output.with_extension("concat.txt");
        let mut list = String::new();
        for path in scene_paths {
            list.push_str(&format!("file '{}'\n", path.display()));
        }
        tokio::fs::write(&list_path, &list).await?;

        let cmd = FfmpegCommand::new(output)
            .pre_input_arg("-f")
            .pre_input_arg("concat")
            .pre_input_arg("-safe")
            .pre_input_arg("0")
            .input(&list_path)
            .output_args(["-c", "copy"])
            .output_args(["-movflags", "+faststart"]);

        self.runner().run(&cmd).await?;
        verify_output(output).await?;

        tokio::fs::remove_file(&list_path).await.ok();

        info!(
            "Concatenated {} segments into {}",
            scene_paths.len(),
            output.display()
        );
        Ok(())
    }
}

/// A render only counts when the file exists and has real content.
pub async fn verify_output(path: &Path) -> MediaResult<()> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(_) => return Err(MediaError::OutputMissing(path.to_path_buf())),
    };
    if metadata.len() < MIN_OUTPUT_BYTES {
        return Err(MediaError::OutputTooSmall {
            path: path.to_path_buf(),
            size: metadata.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verify_output_missing() {
        let err = verify_output(Path::new("/nonexistent/out.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::OutputMissing(_)));
    }

    #[tokio::test]
    async fn test_verify_output_too_small() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        tokio::fs::write(&path, b"tiny").await.unwrap();
        let err = verify_output(&path).await.unwrap_err();
        assert!(matches!(err, MediaError::OutputTooSmall { size: 4, .. }));
    }

    #[tokio::test]
    async fn test_verify_output_accepts_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        tokio::fs::write(&path, vec![0u8; (MIN_OUTPUT_BYTES + 1) as usize])
            .await
            .unwrap();
        assert!(verify_output(&path).await.is_ok());
    }
}
