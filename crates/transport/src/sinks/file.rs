//! FileSink - writes published messages to disk with folder structure

use contracts::{encoding, CameraInfo, ImageMessage, RelayError, RelayMessage, TopicSink};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, error, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));

        Self { base_path }
    }
}

/// Sink that writes messages to disk files
///
/// Output lands under `<base_path>/run-<start time>/<topic>/`, one file per
/// message numbered in arrival order. Images with a PNG-expressible encoding
/// become PNG files; everything else is written raw with a JSON header
/// sidecar. Camera info messages are written as JSON.
pub struct FileSink {
    topic: String,
    topic_dir: PathBuf,
    dir_created: bool,
    write_seq: u64,
}

impl FileSink {
    /// Create a new FileSink
    pub fn new(topic: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        let topic = topic.into();
        let run_dir = config
            .base_path
            .join(format!("run-{}", chrono::Local::now().format("%Y%m%d-%H%M%S")));
        let topic_dir = run_dir.join(sanitize_topic(&topic));

        Ok(Self {
            topic,
            topic_dir,
            dir_created: false,
            write_seq: 0,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        topic: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = FileSinkConfig::from_params(params);
        Self::new(topic, config)
    }

    fn write_message_to_disk(&mut self, message: &RelayMessage) -> std::io::Result<()> {
        if !self.dir_created {
            fs::create_dir_all(&self.topic_dir)?;
            self.dir_created = true;
        }

        let seq = self.write_seq;
        self.write_seq += 1;

        match message {
            RelayMessage::Image(image) => self.save_image(seq, image),
            RelayMessage::Info(info) => self.save_info(seq, info),
        }
    }

    fn save_image(&self, seq: u64, image: &ImageMessage) -> std::io::Result<()> {
        let color_type = match image.encoding.as_str() {
            encoding::RGB8 | encoding::BGR8 => Some(image::ColorType::Rgb8),
            encoding::RGBA8 | encoding::BGRA8 => Some(image::ColorType::Rgba8),
            encoding::MONO8 => Some(image::ColorType::L8),
            _ => None,
        };

        match color_type {
            Some(color_type) => {
                let path = self.topic_dir.join(format!("{seq}.png"));
                let data = match image.encoding.as_str() {
                    // PNG is RGB-ordered; swap the blue-first encodings
                    encoding::BGR8 => swap_channels(&image.data, 3),
                    encoding::BGRA8 => swap_channels(&image.data, 4),
                    _ => image.data.to_vec(),
                };
                image::save_buffer(path, &data, image.width, image.height, color_type)
                    .map_err(std::io::Error::other)
            }
            None => {
                // Depth floats, 16-bit mono and Bayer mosaics keep their raw
                // bytes; the header sidecar carries the decode parameters
                let raw_path = self.topic_dir.join(format!("{seq}.bin"));
                fs::write(raw_path, &image.data)?;

                let meta_path = self.topic_dir.join(format!("{seq}.json"));
                let meta_file = File::create(meta_path)?;
                let header = serde_json::json!({
                    "stamp": image.header.stamp,
                    "frame_id": image.header.frame_id.as_str(),
                    "width": image.width,
                    "height": image.height,
                    "step": image.step,
                    "encoding": image.encoding,
                    "is_bigendian": image.is_bigendian,
                });
                serde_json::to_writer(meta_file, &header)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            }
        }
    }

    fn save_info(&self, seq: u64, info: &CameraInfo) -> std::io::Result<()> {
        let path = self.topic_dir.join(format!("{seq}.json"));
        let file = File::create(path)?;
        serde_json::to_writer(file, info)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    fn persist_message(&mut self, message: &RelayMessage) -> Result<(), RelayError> {
        self.write_message_to_disk(message).map_err(|e| {
            error!(topic = %self.topic, error = %e, "Write failed");
            RelayError::sink_write(&self.topic, e.to_string())
        })
    }
}

/// Swap the first and third channel of every pixel (BGR <-> RGB)
fn swap_channels(data: &[u8], stride: usize) -> Vec<u8> {
    let mut out = data.to_vec();
    for chunk in out.chunks_exact_mut(stride) {
        chunk.swap(0, 2);
    }
    out
}

impl TopicSink for FileSink {
    fn topic(&self) -> &str {
        &self.topic
    }

    #[instrument(
        name = "file_sink_publish",
        skip(self, message),
        fields(topic = %self.topic, kind = message.kind())
    )]
    async fn publish(&mut self, message: &RelayMessage) -> Result<(), RelayError> {
        self.persist_message(message)?;
        Ok(())
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), RelayError> {
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), RelayError> {
        debug!(topic = %self.topic, messages = self.write_seq, "FileSink closed");
        Ok(())
    }
}

/// Make a topic name usable as a directory component
fn sanitize_topic(topic: &str) -> String {
    topic
        .trim_matches('/')
        .chars()
        .map(|c| if c == '/' { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{MessageHeader, RegionOfInterest};
    use tempfile::tempdir;

    fn image_message(encoding_tag: &str, bpp: u32) -> RelayMessage {
        RelayMessage::Image(ImageMessage {
            header: MessageHeader {
                stamp: 1.0,
                frame_id: "camera_link".into(),
            },
            width: 2,
            height: 2,
            step: 2 * bpp,
            encoding: encoding_tag.to_string(),
            is_bigendian: false,
            data: Bytes::from(vec![0u8; (4 * bpp) as usize]),
        })
    }

    #[tokio::test]
    async fn test_file_sink_writes_png() {
        let dir = tempdir().unwrap();
        let config = FileSinkConfig {
            base_path: dir.path().to_path_buf(),
        };

        let mut sink = FileSink::new("/camera/color/image", config).unwrap();
        sink.publish(&image_message(encoding::RGB8, 3)).await.unwrap();
        sink.flush().await.unwrap();

        let png_count = count_files_with_ext(dir.path(), "png");
        assert_eq!(png_count, 1);
    }

    #[tokio::test]
    async fn test_file_sink_raw_fallback() {
        let dir = tempdir().unwrap();
        let config = FileSinkConfig {
            base_path: dir.path().to_path_buf(),
        };

        // 32FC1 depth is not PNG-expressible: raw + sidecar
        let mut sink = FileSink::new("/camera/depth/image", config).unwrap();
        sink.publish(&image_message(encoding::TYPE_32FC1, 4))
            .await
            .unwrap();

        assert_eq!(count_files_with_ext(dir.path(), "bin"), 1);
        assert_eq!(count_files_with_ext(dir.path(), "json"), 1);
    }

    #[tokio::test]
    async fn test_file_sink_writes_info_json() {
        let dir = tempdir().unwrap();
        let config = FileSinkConfig {
            base_path: dir.path().to_path_buf(),
        };

        let info = RelayMessage::Info(CameraInfo {
            header: MessageHeader {
                stamp: 1.0,
                frame_id: "camera_link".into(),
            },
            width: 640,
            height: 480,
            distortion_model: "plumb_bob".to_string(),
            d: [0.0; 5],
            k: [0.0; 9],
            r: [0.0; 9],
            p: [0.0; 12],
            binning_x: 0,
            binning_y: 0,
            roi: RegionOfInterest::default(),
        });

        let mut sink = FileSink::new("/camera/color/info", config).unwrap();
        sink.publish(&info).await.unwrap();

        assert_eq!(count_files_with_ext(dir.path(), "json"), 1);
    }

    #[test]
    fn test_sanitize_topic() {
        assert_eq!(sanitize_topic("/camera/color/image"), "camera_color_image");
        assert_eq!(sanitize_topic("plain"), "plain");
    }

    fn count_files_with_ext(root: &std::path::Path, ext: &str) -> usize {
        let mut count = 0;
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    stack.push(path);
                } else if path.extension().and_then(|e| e.to_str()) == Some(ext) {
                    count += 1;
                }
            }
        }
        count
    }
}
