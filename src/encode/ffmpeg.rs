use crate::encode::bitstream::{AccessUnitSplitter, contains_keyframe};
use crate::encode::codec::{CodecKind, Packet, Received, StreamParams, Submission, VideoEncoder};
use crate::encode::mux::{Muxer, ensure_parent_dir};
use crate::foundation::core::Rational;
use crate::foundation::error::{ArgandError, ArgandResult};
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::JoinHandle;

const READ_CHUNK: usize = 64 * 1024;

/// Options for [`FfmpegEncoder`].
#[derive(Clone, Debug)]
pub struct FfmpegEncoderOpts {
    /// ffmpeg encoder name, e.g. `h264_nvenc` or `libx264`.
    pub codec_name: String,
    /// Encoder preset / quality hint (`-preset`), if any.
    pub preset: Option<String>,
    /// Target bit rate in bits per second.
    pub bit_rate: u64,
    /// Intra frame interval.
    pub gop_size: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frame rate; the encoder time base is its inverse.
    pub frame_rate: Rational,
}

impl FfmpegEncoderOpts {
    /// Validate dimensions, rate and codec.
    pub fn validate(&self) -> ArgandResult<CodecKind> {
        if self.width == 0 || self.height == 0 {
            return Err(ArgandError::validation(
                "ffmpeg encoder width/height must be non-zero",
            ));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(ArgandError::validation(
                "ffmpeg encoder width/height must be even",
            ));
        }
        Rational::new(self.frame_rate.num, self.frame_rate.den)?;
        if self.gop_size == 0 {
            return Err(ArgandError::validation("gop size must be >= 1"));
        }
        match CodecKind::from_encoder_name(&self.codec_name)? {
            CodecKind::RawVideo => Err(ArgandError::validation(
                "the ffmpeg encoder needs an h264/hevc codec; use RawVideoEncoder for rawvideo",
            )),
            codec => Ok(codec),
        }
    }
}

/// Encoder backed by a system `ffmpeg` process.
///
/// Frames go to ffmpeg's stdin as raw `rgb0`; the H.264/HEVC byte stream comes back on stdout
/// with access unit delimiters and without B-frames, so each access unit is one packet and
/// packets leave in submission order. A reader thread splits stdout into packets, which makes
/// "not ready yet" a non-blocking channel poll. After end of stream, receiving blocks until
/// ffmpeg has written everything and exited.
pub struct FfmpegEncoder {
    params: StreamParams,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    units: Receiver<Vec<u8>>,
    stdout_reader: Option<JoinHandle<std::io::Result<()>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    pending_pts: VecDeque<i64>,
    last_pts: Option<i64>,
    eof_sent: bool,
    finished: bool,
}

impl FfmpegEncoder {
    /// Spawn `ffmpeg` configured from `opts`.
    pub fn spawn(opts: &FfmpegEncoderOpts) -> ArgandResult<Self> {
        let codec = opts.validate()?;
        if !is_ffmpeg_on_path() {
            return Err(ArgandError::encoder(
                "ffmpeg is required for video encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb0",
            "-s",
            &format!("{}x{}", opts.width, opts.height),
            "-r",
            &opts.frame_rate.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            &opts.codec_name,
            "-b:v",
            &opts.bit_rate.to_string(),
            "-g",
            &opts.gop_size.to_string(),
            "-bf",
            "0",
        ]);
        if let Some(preset) = opts.preset.as_deref() {
            cmd.args(["-preset", preset]);
        }
        cmd.args([
            "-bsf:v",
            &format!("{}_metadata=aud=insert", codec.ffmpeg_format()),
            "-f",
            codec.ffmpeg_format(),
            "pipe:1",
        ]);

        let mut child = cmd.spawn().map_err(|e| {
            ArgandError::encoder(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ArgandError::encoder("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| ArgandError::encoder("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ArgandError::encoder("failed to open ffmpeg stderr (unexpected)"))?;

        let (tx, units) = mpsc::channel();
        let stdout_reader = std::thread::Builder::new()
            .name("argand-ffmpeg-out".into())
            .spawn(move || -> std::io::Result<()> {
                let mut splitter = AccessUnitSplitter::new(codec);
                let mut chunk = vec![0u8; READ_CHUNK];
                loop {
                    let n = match stdout.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => n,
                        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(e) => return Err(e),
                    };
                    for unit in splitter.push(&chunk[..n]) {
                        if tx.send(unit).is_err() {
                            return Ok(());
                        }
                    }
                }
                if let Some(unit) = splitter.finish() {
                    let _ = tx.send(unit);
                }
                Ok(())
            })
            .map_err(|e| {
                ArgandError::resource_exhausted(format!("failed to start ffmpeg reader: {e}"))
            })?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::info!(
            codec = %opts.codec_name,
            width = opts.width,
            height = opts.height,
            bit_rate = opts.bit_rate,
            "spawned ffmpeg encoder"
        );

        Ok(Self {
            params: StreamParams {
                width: opts.width,
                height: opts.height,
                time_base: opts.frame_rate.invert(),
                frame_rate: opts.frame_rate,
                codec,
                bit_rate: opts.bit_rate,
                gop_size: opts.gop_size,
            },
            child: Some(child),
            stdin: Some(stdin),
            units,
            stdout_reader: Some(stdout_reader),
            stderr_drain: Some(stderr_drain),
            scratch: Vec::new(),
            pending_pts: VecDeque::new(),
            last_pts: None,
            eof_sent: false,
            finished: false,
        })
    }

    fn next_packet(&mut self, data: Vec<u8>) -> ArgandResult<Received> {
        let pts = self.pending_pts.pop_front().ok_or_else(|| {
            ArgandError::encoder("ffmpeg emitted more access units than frames submitted")
        })?;
        let keyframe = contains_keyframe(self.params.codec, &data);
        Ok(Received::Packet(Packet {
            pts,
            data,
            keyframe,
        }))
    }

    // Wait for ffmpeg to exit and surface its stderr on failure.
    fn reap(&mut self) -> ArgandResult<()> {
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let status = child.wait().map_err(|e| {
            ArgandError::encoder(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let read_result = match self.stdout_reader.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ArgandError::encoder("ffmpeg stdout reader thread panicked"))?,
            None => Ok(()),
        };
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ArgandError::encoder("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ArgandError::encoder(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ArgandError::encoder(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        read_result
            .map_err(|e| ArgandError::encoder(format!("failed to read ffmpeg output: {e}")))?;
        Ok(())
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn params(&self) -> &StreamParams {
        &self.params
    }

    fn send(&mut self, submission: Submission<'_>) -> ArgandResult<()> {
        if self.eof_sent {
            return Err(ArgandError::encoder(
                "ffmpeg encoder received input after end of stream",
            ));
        }
        let (buffer, pts) = match submission {
            Submission::Frame { buffer, pts } => (buffer, pts),
            Submission::EndOfStream => {
                // Closing stdin makes ffmpeg flush and exit.
                drop(self.stdin.take());
                self.eof_sent = true;
                return Ok(());
            }
        };

        if buffer.width() != self.params.width || buffer.height() != self.params.height {
            return Err(ArgandError::encoder(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                buffer.width(),
                buffer.height(),
                self.params.width,
                self.params.height
            )));
        }
        if let Some(last) = self.last_pts
            && pts <= last
        {
            return Err(ArgandError::encoder(format!(
                "non-increasing pts {pts} (previous {last})"
            )));
        }

        self.scratch.clear();
        for row in buffer.rows() {
            self.scratch.extend_from_slice(row);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ArgandError::encoder("ffmpeg stdin is closed"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            ArgandError::encoder(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        self.pending_pts.push_back(pts);
        self.last_pts = Some(pts);
        Ok(())
    }

    fn receive(&mut self) -> ArgandResult<Received> {
        if self.finished {
            return Ok(Received::Eof);
        }

        let unit = if self.eof_sent {
            self.units.recv().ok()
        } else {
            match self.units.try_recv() {
                Ok(unit) => Some(unit),
                Err(TryRecvError::Empty) => return Ok(Received::Again),
                Err(TryRecvError::Disconnected) => None,
            }
        };
        if let Some(data) = unit {
            return self.next_packet(data);
        }

        // Output closed: ffmpeg is done, or died.
        self.reap()?;
        if !self.eof_sent {
            return Err(ArgandError::encoder(
                "ffmpeg closed its output before end of stream",
            ));
        }
        if !self.pending_pts.is_empty() {
            tracing::warn!(
                missing = self.pending_pts.len(),
                "ffmpeg produced fewer access units than frames submitted"
            );
        }
        self.finished = true;
        Ok(Received::Eof)
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Options for [`FfmpegMuxer`].
#[derive(Clone, Debug)]
pub struct FfmpegMuxerOpts {
    /// Output container path; the format follows its extension (`.mp4`, `.mkv`, ...).
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
}

impl FfmpegMuxerOpts {
    /// Create options for writing a container to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
        }
    }
}

/// Muxer that remuxes the elementary stream into a container with `ffmpeg -c copy`.
///
/// The header spawns ffmpeg, packets are streamed to its stdin and the trailer waits for it to
/// finalize the file. Packet timestamps are not forwarded: the elementary stream carries none,
/// so container timing is rebuilt from the frame rate. The stream time base is therefore the
/// encoder's own and packets pass through [`MuxSession`](crate::encode::mux::MuxSession)
/// unscaled.
///
/// MP4 has no mapping for uncompressed video; raw streams have to go to `.mkv` or `.mov`.
pub struct FfmpegMuxer {
    opts: FfmpegMuxerOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl FfmpegMuxer {
    /// Create a muxer; nothing is spawned until the header is written.
    pub fn new(opts: FfmpegMuxerOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
        }
    }

    fn has_extension(&self, exts: &[&str]) -> bool {
        self.opts
            .out_path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| exts.iter().any(|x| e.eq_ignore_ascii_case(x)))
    }
}

impl Muxer for FfmpegMuxer {
    fn write_header(&mut self, params: &StreamParams) -> ArgandResult<()> {
        if params.codec == CodecKind::RawVideo && self.has_extension(&["mp4", "m4v"]) {
            return Err(ArgandError::validation(format!(
                "'{}': MP4 cannot hold uncompressed video; use .mkv or .mov for the raw encoder",
                self.opts.out_path.display()
            )));
        }
        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ArgandError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(ArgandError::mux(
                "ffmpeg is required for container output, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });
        cmd.args(["-hide_banner", "-loglevel", "error"]);

        let rate = params.frame_rate.to_string();
        match params.codec {
            CodecKind::H264 | CodecKind::Hevc => {
                cmd.args(["-f", params.codec.ffmpeg_format(), "-framerate", &rate]);
            }
            CodecKind::RawVideo => {
                cmd.args([
                    "-f",
                    "rawvideo",
                    "-pix_fmt",
                    "rgb24",
                    "-s",
                    &format!("{}x{}", params.width, params.height),
                    "-framerate",
                    &rate,
                ]);
            }
        }
        cmd.args(["-i", "pipe:0", "-c", "copy"]);

        if self.has_extension(&["mp4", "m4v", "mov"]) {
            cmd.args(["-movflags", "+faststart"]);
        }
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            ArgandError::mux(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ArgandError::mux("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ArgandError::mux("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        Ok(())
    }

    fn write_packet(&mut self, packet: &Packet) -> ArgandResult<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ArgandError::mux("ffmpeg muxer is not running"));
        };
        stdin
            .write_all(&packet.data)
            .map_err(|e| ArgandError::mux(format!("failed to write packet to ffmpeg stdin: {e}")))
    }

    fn write_trailer(&mut self) -> ArgandResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ArgandError::mux("ffmpeg muxer not started"))?;

        let status = child.wait().map_err(|e| {
            ArgandError::mux(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ArgandError::mux("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ArgandError::mux(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ArgandError::mux(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        tracing::info!(path = %self.opts.out_path.display(), "container finalized");
        Ok(())
    }
}

impl Drop for FfmpegMuxer {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.wait();
        }
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
