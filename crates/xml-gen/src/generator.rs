use std::borrow::Cow;
use std::fmt;
use std::io::Write;

use tracing::{debug, trace};

use crate::{BufferSink, Sink, StreamSink, Value, XmlGenError};

/// Date pattern producing the parsable `2024-05-17T13:45:30.250` shape.
const PARSABLE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
const DEFAULT_VERSION: f64 = 1.0;
const DEFAULT_ENCODING: &str = "UTF-8";
const DEFAULT_NAMESPACE: &str = "xmlns";

/// Escapes a string for placement inside an attribute value.
///
/// Every double quote becomes `\"` (backslash plus quote). That is the only
/// substitution: `<`, `>`, `&` and apostrophes pass through untouched, so
/// values carrying those characters reach the output verbatim.
pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    if value.contains('"') {
        Cow::Owned(value.replace('"', "\\\""))
    } else {
        Cow::Borrowed(value)
    }
}

/// Joins a namespace prefix and a name; an empty prefix yields the bare name.
fn qualify<'a>(namespace: &str, name: &'a str) -> Cow<'a, str> {
    if namespace.is_empty() {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{namespace}:{name}"))
    }
}

/// Streaming XML generator with a fluent, chainable API.
///
/// Every call serializes its fragment immediately into the owned [`Sink`]
/// and hands the generator back, so a whole document reads as one chain:
///
/// ```
/// use xml_gen::XmlGenerator;
///
/// let mut generator = XmlGenerator::common();
/// generator
///     .write_xml_start()?
///     .write_open_tag("root")?
///     .write_attribute("id", "1")?
///     .write_close_tag()?
///     .write("hello")?
///     .write_close_node()?;
///
/// assert_eq!(
///     generator.render().unwrap(),
///     r#"<?xml version="1.0" encoding="UTF-8"?><root id="1">hello</root>"#
/// );
/// # Ok::<(), xml_gen::XmlGenError>(())
/// ```
///
/// Open tags are tracked on a stack so [`XmlGenerator::write_close_node`]
/// can close the most recent element without being told its name. The
/// generator is a forward-only writer: no parsing, no validation, no
/// pretty-printing.
pub struct XmlGenerator {
    version: f64,
    encoding: String,
    default_namespace: String,
    date_format: String,
    tag_stack: Vec<String>,
    sink: Box<dyn Sink>,
}

impl std::fmt::Debug for XmlGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlGenerator")
            .field("version", &self.version)
            .field("encoding", &self.encoding)
            .field("default_namespace", &self.default_namespace)
            .field("date_format", &self.date_format)
            .field("tag_stack", &self.tag_stack)
            .finish_non_exhaustive()
    }
}

impl XmlGenerator {
    fn with_sink(sink: Box<dyn Sink>, date_format: String) -> Self {
        XmlGenerator {
            version: DEFAULT_VERSION,
            encoding: DEFAULT_ENCODING.to_owned(),
            default_namespace: DEFAULT_NAMESPACE.to_owned(),
            date_format,
            tag_stack: Vec::new(),
            sink,
        }
    }

    /// Creates a buffer-backed generator with the default date format.
    pub fn common() -> Self {
        Self::with_sink(
            Box::new(BufferSink::new()),
            PARSABLE_DATE_FORMAT.to_owned(),
        )
    }

    /// Creates a buffer-backed generator seeded with an existing buffer.
    pub fn from_buffer(buffer: String) -> Self {
        Self::with_sink(
            Box::new(BufferSink::from_string(buffer)),
            PARSABLE_DATE_FORMAT.to_owned(),
        )
    }

    /// Creates a generator writing through to a byte stream.
    ///
    /// # Example
    ///
    /// ```
    /// use xml_gen::XmlGenerator;
    /// let generator = XmlGenerator::from_stream(std::io::sink());
    /// ```
    pub fn from_stream<W: Write + 'static>(stream: W) -> Self {
        Self::with_sink(
            Box::new(StreamSink::new(stream)),
            PARSABLE_DATE_FORMAT.to_owned(),
        )
    }

    /// Creates a buffer-backed generator with a custom chrono date pattern.
    pub fn with_format(format: impl Into<String>) -> Self {
        Self::with_sink(Box::new(BufferSink::new()), format.into())
    }

    /// Creates a seeded buffer-backed generator with a custom date pattern.
    pub fn from_buffer_with_format(buffer: String, format: impl Into<String>) -> Self {
        Self::with_sink(Box::new(BufferSink::from_string(buffer)), format.into())
    }

    /// Creates a stream-backed generator with a custom date pattern.
    pub fn from_stream_with_format<W: Write + 'static>(
        stream: W,
        format: impl Into<String>,
    ) -> Self {
        Self::with_sink(Box::new(StreamSink::new(stream)), format.into())
    }

    /// Sets the chrono pattern used to render date values.
    ///
    /// Takes effect for subsequent writes only.
    pub fn set_date_format(&mut self, format: impl Into<String>) -> &mut Self {
        self.date_format = format.into();
        self
    }

    /// Sets the namespace prefix used by the `*_default_ns` methods.
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.default_namespace = namespace.into();
        self
    }

    /// Sets the version written by the next [`XmlGenerator::write_xml_start`].
    pub fn set_version(&mut self, version: f64) -> &mut Self {
        self.version = version;
        self
    }

    /// Sets the encoding written by the next [`XmlGenerator::write_xml_start`].
    pub fn set_encoding(&mut self, encoding: impl Into<String>) -> &mut Self {
        self.encoding = encoding.into();
        self
    }

    pub fn version(&self) -> f64 {
        self.version
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Writes the XML declaration and starts a fresh document.
    ///
    /// Emits `<?xml version="X.X" encoding="ENC"?>` with the configured
    /// version (one fractional digit) and encoding, then clears the tag
    /// stack unconditionally.
    pub fn write_xml_start(&mut self) -> Result<&mut Self, XmlGenError> {
        let version = format!("{:.1}", self.version);
        let encoding = self.encoding.clone();

        self.write_open_tag("?xml")?
            .write_attribute("version", &version)?
            .write_attribute("encoding", &encoding)?
            .write_close_tag_with("?")?;

        self.tag_stack.clear();
        trace!("xml declaration written, tag stack cleared");

        Ok(self)
    }

    /// Writes a scalar as text content into whatever tag is currently open.
    ///
    /// Anything convertible to [`Value`] is accepted: `Null` renders as the
    /// literal `null`, dates use the configured format, floats render with
    /// exactly two decimal digits, text passes through unchanged.
    pub fn write<'v>(&mut self, value: impl Into<Value<'v>>) -> Result<&mut Self, XmlGenError> {
        match value.into() {
            Value::Null => self.sink.append("null")?,
            Value::Text(text) => self.sink.append(&text)?,
            Value::DateTime(when) => {
                let rendered = when.format(&self.date_format).to_string();
                self.sink.append(&rendered)?;
            }
            Value::Float(number) => self.sink.append(&format!("{number:.2}"))?,
            Value::Other(rendered) => self.sink.append(&rendered)?,
        }

        Ok(self)
    }

    /// Writes `<name` without the terminating `>` and pushes the tag.
    ///
    /// Follow with attribute writes and a [`XmlGenerator::write_close_tag`].
    pub fn write_open_tag(&mut self, name: &str) -> Result<&mut Self, XmlGenError> {
        self.sink.append("<")?;
        self.sink.append(name)?;
        self.tag_stack.push(name.to_owned());
        Ok(self)
    }

    /// Writes `<namespace:name` without the terminating `>` and pushes the
    /// qualified tag. An empty namespace falls back to the bare name.
    pub fn write_open_tag_ns(
        &mut self,
        namespace: &str,
        name: &str,
    ) -> Result<&mut Self, XmlGenError> {
        let tag = qualify(namespace, name);
        self.sink.append("<")?;
        self.sink.append(&tag)?;
        self.tag_stack.push(tag.into_owned());
        Ok(self)
    }

    /// Opens a tag qualified with the configured default namespace.
    pub fn write_open_tag_default_ns(&mut self, name: &str) -> Result<&mut Self, XmlGenError> {
        let namespace = self.default_namespace.clone();
        self.write_open_tag_ns(&namespace, name)
    }

    /// Writes a bare attribute token: a space followed by `name`.
    pub fn write_attribute_name(&mut self, name: &str) -> Result<&mut Self, XmlGenError> {
        self.sink.append(" ")?;
        self.sink.append(name)?;
        Ok(self)
    }

    /// Writes ` name="value"` with the value quote-escaped.
    pub fn write_attribute(&mut self, name: &str, value: &str) -> Result<&mut Self, XmlGenError> {
        self.sink.append(" ")?;
        self.sink.append(name)?;
        self.sink.append("=\"")?;
        self.sink.append(&escape_attribute(value))?;
        self.sink.append("\"")?;
        Ok(self)
    }

    /// Writes ` namespace:name="value"` with the value quote-escaped.
    pub fn write_attribute_ns(
        &mut self,
        namespace: &str,
        name: &str,
        value: &str,
    ) -> Result<&mut Self, XmlGenError> {
        let qualified = qualify(namespace, name);
        self.write_attribute(&qualified, value)
    }

    /// Writes an attribute qualified with the configured default namespace.
    pub fn write_attribute_default_ns(
        &mut self,
        name: &str,
        value: &str,
    ) -> Result<&mut Self, XmlGenError> {
        let namespace = self.default_namespace.clone();
        self.write_attribute_ns(&namespace, name, value)
    }

    /// Terminates the currently open start-tag with `>`.
    pub fn write_close_tag(&mut self) -> Result<&mut Self, XmlGenError> {
        self.sink.append(">")?;
        Ok(self)
    }

    /// Writes `suffix` then `>`; the declaration closes with suffix `?`.
    pub fn write_close_tag_with(&mut self, suffix: &str) -> Result<&mut Self, XmlGenError> {
        self.sink.append(suffix)?;
        self.sink.append(">")?;
        Ok(self)
    }

    /// Opens a tag and immediately terminates its start-tag, leaving the
    /// element open on the stack for children.
    pub fn write_node_start(&mut self, name: &str) -> Result<&mut Self, XmlGenError> {
        self.write_open_tag(name)?.write_close_tag()
    }

    /// Namespace-qualified form of [`XmlGenerator::write_node_start`].
    pub fn write_node_start_ns(
        &mut self,
        namespace: &str,
        name: &str,
    ) -> Result<&mut Self, XmlGenError> {
        self.write_open_tag_ns(namespace, name)?.write_close_tag()
    }

    /// Writes a complete empty element: `<name></name>`.
    pub fn write_node(&mut self, name: &str) -> Result<&mut Self, XmlGenError> {
        self.write_open_tag(name)?
            .write_close_tag()?
            .write_close_node_named(name)
    }

    /// Writes a complete empty element with a namespace prefix.
    pub fn write_node_ns(&mut self, namespace: &str, name: &str) -> Result<&mut Self, XmlGenError> {
        self.write_open_tag_ns(namespace, name)?
            .write_close_tag()?
            .write_close_node_ns(namespace, name)
    }

    /// Writes a complete element with text content in one call:
    /// `<namespace:name>text</namespace:name>`.
    pub fn write_node_text(
        &mut self,
        namespace: &str,
        name: &str,
        text: &str,
    ) -> Result<&mut Self, XmlGenError> {
        self.write_open_tag_ns(namespace, name)?
            .write_close_tag()?
            .write(text)?
            .write_close_node_ns(namespace, name)
    }

    /// Closes the most recently opened element and pops it off the stack.
    ///
    /// # Errors
    ///
    /// Returns [`XmlGenError::NoOpenTag`] when nothing is open; nothing is
    /// emitted in that case.
    pub fn write_close_node(&mut self) -> Result<&mut Self, XmlGenError> {
        let Some(tag) = self.tag_stack.pop() else {
            debug!("close node requested with an empty tag stack");
            return Err(XmlGenError::NoOpenTag);
        };

        self.sink.append("</")?;
        self.sink.append(&tag)?;
        self.sink.append(">")?;
        Ok(self)
    }

    /// Writes `</name>` using the given name rather than the stack top.
    ///
    /// The first matching stack entry, scanning from the oldest open tag, is
    /// removed; a name that was never opened still emits its end-tag and
    /// leaves the stack untouched.
    pub fn write_close_node_named(&mut self, name: &str) -> Result<&mut Self, XmlGenError> {
        self.sink.append("</")?;
        self.sink.append(name)?;
        self.sink.append(">")?;
        self.remove_from_stack(name);
        Ok(self)
    }

    /// Writes `</namespace:name>`; stack bookkeeping as in
    /// [`XmlGenerator::write_close_node_named`].
    pub fn write_close_node_ns(
        &mut self,
        namespace: &str,
        name: &str,
    ) -> Result<&mut Self, XmlGenError> {
        let tag = qualify(namespace, name);
        self.sink.append("</")?;
        self.sink.append(&tag)?;
        self.sink.append(">")?;
        self.remove_from_stack(&tag);
        Ok(self)
    }

    /// Closes a node qualified with the configured default namespace.
    pub fn write_close_node_default_ns(&mut self, name: &str) -> Result<&mut Self, XmlGenError> {
        let namespace = self.default_namespace.clone();
        self.write_close_node_ns(&namespace, name)
    }

    /// Returns the accumulated text; `None` for a stream-backed generator.
    pub fn render(&self) -> Option<&str> {
        self.sink.render()
    }

    /// Consumes the generator, returning the accumulated text when
    /// buffer-backed.
    pub fn into_string(self) -> Option<String> {
        self.sink.into_text()
    }

    fn remove_from_stack(&mut self, tag: &str) {
        if let Some(index) = self.tag_stack.iter().position(|open| open == tag) {
            self.tag_stack.remove(index);
        }
    }
}

impl fmt::Display for XmlGenerator {
    /// Formats as the accumulated text; empty for stream-backed generators.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.render().unwrap_or_default())
    }
}
