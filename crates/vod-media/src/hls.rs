//! Multi-rendition HLS transcode and master playlist generation.
//!
//! One FFmpeg invocation produces every rendition's media playlist and
//! segments via `-var_stream_map`. The master playlist is NOT produced by
//! FFmpeg: it is written afterwards, once each media playlist is verified
//! on disk, so the master can never precede or disagree with its children.

use std::path::{Path, PathBuf};

use tracing::info;

use vod_models::rendition::{
    RenditionLadder, AUDIO_SAMPLE_RATE, DEFAULT_AUDIO_CODEC, DEFAULT_VIDEO_CODEC,
};
use vod_models::MASTER_PLAYLIST;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Build the FFmpeg command for one ladder transcode.
///
/// Output files land under `output_dir` as `{name}/playlist.m3u8` and
/// `{name}/segment-%03d.ts` per rendition.
pub fn hls_command(input: &Path, output_dir: &Path, ladder: &RenditionLadder) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(input, output_dir.join("%v").join("playlist.m3u8"));

    // One video/audio stream pair per rendition
    for _ in &ladder.renditions {
        cmd = cmd.output_args(["-map", "0:v:0", "-map", "0:a:0"]);
    }

    cmd = cmd.output_args([
        "-c:v".to_string(),
        DEFAULT_VIDEO_CODEC.to_string(),
        "-crf".to_string(),
        ladder.crf.to_string(),
        "-c:a".to_string(),
        DEFAULT_AUDIO_CODEC.to_string(),
        "-ar".to_string(),
        AUDIO_SAMPLE_RATE.to_string(),
    ]);

    for (i, r) in ladder.renditions.iter().enumerate() {
        cmd = cmd.output_args([
            format!("-filter:v:{i}"),
            format!("scale=w={}:h={}", r.width, r.height),
            format!("-maxrate:v:{i}"),
            format!("{}k", r.video_maxrate_kbps),
            format!("-b:a:{i}"),
            format!("{}k", r.audio_bitrate_kbps),
        ]);
    }

    cmd.output_args(["-var_stream_map".to_string(), ladder.var_stream_map()])
        .output_args(["-preset".to_string(), ladder.preset.clone()])
        .output_args(["-hls_list_size", "0"])
        .output_args(["-threads", "0"])
        .output_args(["-f", "hls"])
        .output_args(["-hls_playlist_type", "event"])
        .output_args(["-hls_time".to_string(), ladder.segment_seconds.to_string()])
        .output_args(["-hls_flags", "independent_segments"])
        .output_args([
            "-hls_segment_filename".to_string(),
            output_dir
                .join("%v")
                .join("segment-%03d.ts")
                .to_string_lossy()
                .to_string(),
        ])
}

/// Transcode the source into every rendition of the ladder.
///
/// Fails with the captured FFmpeg diagnostics on a non-zero exit. The
/// master playlist is not written here; call [`write_master_playlist`]
/// after this returns.
pub async fn transcode_to_hls(
    input: &Path,
    output_dir: &Path,
    ladder: &RenditionLadder,
) -> MediaResult<()> {
    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    // FFmpeg does not create the per-rendition sub-directories itself
    for r in &ladder.renditions {
        tokio::fs::create_dir_all(output_dir.join(&r.name)).await?;
    }

    let cmd = hls_command(input, output_dir, ladder);
    FfmpegRunner::new().run(&cmd).await?;

    info!(
        renditions = ladder.renditions.len(),
        "HLS transcode completed"
    );
    Ok(())
}

/// Write the master playlist referencing every rendition of the ladder.
///
/// Every media playlist must already exist on disk; a missing one aborts
/// before anything is written.
pub async fn write_master_playlist(
    output_dir: &Path,
    ladder: &RenditionLadder,
) -> MediaResult<PathBuf> {
    for r in &ladder.renditions {
        let playlist = output_dir.join(r.playlist_path());
        if !playlist.exists() {
            return Err(MediaError::PlaylistMissing(playlist));
        }
    }

    let mut master = String::from("#EXTM3U\n#EXT-X-VERSION:3\n");
    for r in &ladder.renditions {
        master.push_str(&format!(
            "#EXT-X-STREAM-INF:BANDWIDTH={},RESOLUTION={}\n{}\n",
            r.bandwidth(),
            r.resolution(),
            r.playlist_path()
        ));
    }

    let path = output_dir.join(MASTER_PLAYLIST);
    tokio::fs::write(&path, master).await?;

    info!(path = %path.display(), "Wrote master playlist");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vod_models::rendition::Rendition;

    #[test]
    fn test_hls_command_args() {
        let ladder = RenditionLadder::default();
        let args = hls_command(Path::new("input.mp4"), Path::new("out"), &ladder).build_args();

        // One map pair per rendition
        assert_eq!(args.iter().filter(|a| *a == "-map").count(), 6);

        assert!(args.contains(&"-var_stream_map".to_string()));
        assert!(args.contains(&"v:0,a:0,name:360p v:1,a:1,name:480p v:2,a:2,name:720p".to_string()));
        assert!(args.contains(&"scale=w=480:h=360".to_string()));
        assert!(args.contains(&"scale=w=640:h=480".to_string()));
        assert!(args.contains(&"scale=w=1280:h=720".to_string()));
        assert!(args.contains(&"-hls_time".to_string()));
        assert!(args.contains(&"3".to_string()));
        assert!(args.contains(&"independent_segments".to_string()));

        // No master playlist from FFmpeg itself
        assert!(!args.contains(&"-master_pl_name".to_string()));

        let output = args.last().unwrap();
        assert!(output.ends_with("playlist.m3u8"));
        assert!(output.contains("%v"));
    }

    async fn seed_playlists(dir: &Path, names: &[&str]) {
        for name in names {
            let sub = dir.join(name);
            tokio::fs::create_dir_all(&sub).await.unwrap();
            tokio::fs::write(sub.join("playlist.m3u8"), "#EXTM3U\n")
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_master_references_every_rendition_in_order() {
        let dir = TempDir::new().unwrap();
        seed_playlists(dir.path(), &["360p", "480p", "720p"]).await;

        let ladder = RenditionLadder::default();
        let path = write_master_playlist(dir.path(), &ladder).await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.starts_with("#EXTM3U"));

        let p360 = content.find("360p/playlist.m3u8").unwrap();
        let p480 = content.find("480p/playlist.m3u8").unwrap();
        let p720 = content.find("720p/playlist.m3u8").unwrap();
        assert!(p360 < p480 && p480 < p720);

        assert!(content.contains("RESOLUTION=480x360"));
        assert!(content.contains("RESOLUTION=1280x720"));
        assert!(content.contains(&format!("BANDWIDTH={}", ladder.renditions[0].bandwidth())));
    }

    #[tokio::test]
    async fn test_master_not_written_before_children_exist() {
        let dir = TempDir::new().unwrap();
        // 720p playlist intentionally absent
        seed_playlists(dir.path(), &["360p", "480p"]).await;

        let ladder = RenditionLadder::default();
        let err = write_master_playlist(dir.path(), &ladder).await.unwrap_err();
        assert!(matches!(err, MediaError::PlaylistMissing(_)));

        // Nothing written on failure
        assert!(!dir.path().join(MASTER_PLAYLIST).exists());
    }

    #[tokio::test]
    async fn test_master_matches_custom_ladder() {
        let dir = TempDir::new().unwrap();
        seed_playlists(dir.path(), &["240p"]).await;

        let ladder = RenditionLadder {
            renditions: vec![Rendition::new("240p", 320, 240, 300, 64)],
            ..RenditionLadder::default()
        };

        let path = write_master_playlist(dir.path(), &ladder).await.unwrap();
        let content = tokio::fs::read_to_string(&path).await.unwrap();

        assert_eq!(content.matches("#EXT-X-STREAM-INF").count(), 1);
        assert!(content.contains("240p/playlist.m3u8"));
        assert!(!content.contains("360p"));
    }
}
