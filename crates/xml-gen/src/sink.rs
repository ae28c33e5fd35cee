use std::io::Write;

use crate::XmlGenError;

/// Destination for serialized XML text.
///
/// The generator owns exactly one sink and pushes every fragment through it
/// the moment it is produced; nothing is held back or reordered.
pub trait Sink {
    /// Appends a fragment of serialized text to the destination.
    fn append(&mut self, text: &str) -> Result<(), XmlGenError>;

    /// Returns the accumulated text, when the sink keeps one.
    ///
    /// Stream-backed sinks hand their bytes to the underlying writer and
    /// return `None`.
    fn render(&self) -> Option<&str>;

    /// Consumes the sink, returning the accumulated text when it keeps one.
    fn into_text(self: Box<Self>) -> Option<String>;
}

/// Sink backed by a growable in-memory buffer.
#[derive(Debug, Default)]
pub struct BufferSink {
    buffer: String,
}

impl BufferSink {
    /// Creates an empty buffer sink.
    ///
    /// # Example
    ///
    /// ```
    /// use xml_gen::BufferSink;
    /// let sink = BufferSink::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing buffer; text already present is kept and appended to.
    pub fn from_string(buffer: String) -> Self {
        BufferSink { buffer }
    }

    /// Consumes the sink and returns its contents.
    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl Sink for BufferSink {
    fn append(&mut self, text: &str) -> Result<(), XmlGenError> {
        self.buffer.push_str(text);
        Ok(())
    }

    fn render(&self) -> Option<&str> {
        Some(&self.buffer)
    }

    fn into_text(self: Box<Self>) -> Option<String> {
        Some(self.buffer)
    }
}

/// Sink that encodes each fragment and writes it straight to a byte stream.
///
/// A failed write surfaces as [`XmlGenError::Io`] from the generator call
/// that produced the fragment; the stream is left in whatever state the
/// failure produced.
pub struct StreamSink<W: Write> {
    stream: W,
}

impl<W: Write> StreamSink<W> {
    /// Wraps an open output stream.
    ///
    /// # Example
    ///
    /// ```
    /// use xml_gen::StreamSink;
    /// let sink = StreamSink::new(Vec::<u8>::new());
    /// ```
    pub fn new(stream: W) -> Self {
        StreamSink { stream }
    }

    /// Returns a reference to the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.stream
    }

    /// Consumes the sink, returning the underlying stream.
    pub fn into_inner(self) -> W {
        self.stream
    }
}

impl<W: Write> Sink for StreamSink<W> {
    fn append(&mut self, text: &str) -> Result<(), XmlGenError> {
        self.stream.write_all(text.as_bytes())?;
        Ok(())
    }

    fn render(&self) -> Option<&str> {
        None
    }

    fn into_text(self: Box<Self>) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_sink_accumulates_appends() {
        let mut sink = BufferSink::new();
        sink.append("<a>").unwrap();
        sink.append("text").unwrap();
        sink.append("</a>").unwrap();
        assert_eq!(sink.render(), Some("<a>text</a>"));
    }

    #[test]
    fn buffer_sink_keeps_seeded_contents() {
        let mut sink = BufferSink::from_string(String::from("<!-- head -->"));
        sink.append("<a/>").unwrap();
        assert_eq!(sink.into_string(), "<!-- head --><a/>");
    }

    #[test]
    fn stream_sink_writes_through() {
        let mut sink = StreamSink::new(Vec::<u8>::new());
        sink.append("<a>").unwrap();
        sink.append("text").unwrap();
        assert_eq!(sink.get_ref().as_slice(), b"<a>text");
        assert_eq!(sink.into_inner(), b"<a>text".to_vec());
    }

    #[test]
    fn stream_sink_has_no_rendered_text() {
        let sink = StreamSink::new(Vec::<u8>::new());
        assert!(sink.render().is_none());
        assert!(Box::new(sink).into_text().is_none());
    }

    #[test]
    fn stream_sink_surfaces_io_failure() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "stream closed",
                ))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut sink = StreamSink::new(Broken);
        let error = sink.append("<a>").unwrap_err();
        assert!(matches!(error, XmlGenError::Io(_)));
    }
}
