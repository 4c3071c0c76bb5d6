//! Output collaborators.
//!
//! The engine hands each serialized result to a [`ResultSink`]. What happens
//! after that (a broker, a file, another thread) is the sink's business; a
//! failed publish is reported back as an [`EmissionError`] and never retried
//! here.

use std::io::Write;

use crossbeam_channel::Sender;

use crate::error::EmissionError;

/// A keyed, serialized result message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    /// Message key (the group key).
    pub key: String,
    /// Serialized JSON value.
    pub payload: Vec<u8>,
}

impl OutputRecord {
    /// The payload as UTF-8 text.
    pub fn payload_str(&self) -> &str {
        std::str::from_utf8(&self.payload).unwrap_or_default()
    }
}

/// Accepts published results.
pub trait ResultSink {
    fn publish(&mut self, record: OutputRecord) -> Result<(), EmissionError>;

    /// Flush buffered output. Default: nothing buffered.
    fn flush(&mut self) -> Result<(), EmissionError> {
        Ok(())
    }
}

impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    fn publish(&mut self, record: OutputRecord) -> Result<(), EmissionError> {
        self.as_mut().publish(record)
    }

    fn flush(&mut self) -> Result<(), EmissionError> {
        self.as_mut().flush()
    }
}

/// In-memory sink that keeps every record. Used by tests and demos.
#[derive(Debug, Default)]
pub struct CollectingSink {
    records: Vec<OutputRecord>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[OutputRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<OutputRecord> {
        self.records
    }
}

impl ResultSink for CollectingSink {
    fn publish(&mut self, record: OutputRecord) -> Result<(), EmissionError> {
        self.records.push(record);
        Ok(())
    }
}

/// Writes one `{"key": ..., "value": ...}` JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for JsonLinesSink<W> {
    fn publish(&mut self, record: OutputRecord) -> Result<(), EmissionError> {
        let key = serde_json::to_string(&record.key).map_err(|source| EmissionError::Serialize {
            key: record.key.clone(),
            source,
        })?;
        let publish_err = |err: std::io::Error| EmissionError::Publish {
            key: record.key.clone(),
            reason: err.to_string(),
        };
        write!(self.writer, "{{\"key\":{key},\"value\":").map_err(publish_err)?;
        self.writer.write_all(&record.payload).map_err(publish_err)?;
        self.writer.write_all(b"}\n").map_err(publish_err)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), EmissionError> {
        self.writer.flush().map_err(|err| EmissionError::Publish {
            key: String::new(),
            reason: err.to_string(),
        })
    }
}

/// Forwards records to another thread over a crossbeam channel.
///
/// Blocks when the channel is full. Fails once the receiver is gone.
#[derive(Clone)]
pub struct ChannelSink {
    sender: Sender<OutputRecord>,
}

impl ChannelSink {
    pub fn new(sender: Sender<OutputRecord>) -> Self {
        Self { sender }
    }
}

impl ResultSink for ChannelSink {
    fn publish(&mut self, record: OutputRecord) -> Result<(), EmissionError> {
        self.sender.send(record).map_err(|err| EmissionError::Publish {
            key: err.into_inner().key,
            reason: "channel closed: collector dropped".to_string(),
        })
    }
}
