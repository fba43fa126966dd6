//! LogSink - logs message summaries via tracing

use contracts::{RelayError, RelayMessage, TopicSink};
use tracing::{info, instrument};

/// Sink that logs message summaries for debugging
pub struct LogSink {
    topic: String,
}

impl LogSink {
    /// Create a new LogSink for the given topic
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }

    fn log_message_summary(&self, message: &RelayMessage) {
        match message {
            RelayMessage::Image(image) => {
                info!(
                    topic = %self.topic,
                    stamp = image.header.stamp,
                    width = image.width,
                    height = image.height,
                    encoding = %image.encoding,
                    bytes = image.data.len(),
                    "Image published"
                );
            }
            RelayMessage::Info(info_msg) => {
                info!(
                    topic = %self.topic,
                    stamp = info_msg.header.stamp,
                    width = info_msg.width,
                    height = info_msg.height,
                    model = %info_msg.distortion_model,
                    "Camera info published"
                );
            }
        }
    }
}

impl TopicSink for LogSink {
    fn topic(&self) -> &str {
        &self.topic
    }

    #[instrument(
        name = "log_sink_publish",
        skip(self, message),
        fields(topic = %self.topic, kind = message.kind())
    )]
    async fn publish(&mut self, message: &RelayMessage) -> Result<(), RelayError> {
        self.log_message_summary(message);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), RelayError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), RelayError> {
        info!(topic = %self.topic, "LogSink closed");
        Ok(())
    }
}
