use std::io;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::ser::{CharEscape, CompactFormatter, Formatter, PrettyFormatter};

use crate::error::SerializeError;
use crate::ser::TokenSink;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Container {
    Array,
    Object,
}

struct Frame {
    container: Container,
    first: bool,
    // Inside an object: a field name was written, its value was not.
    named: bool,
}

fn misuse(message: &'static str) -> SerializeError {
    SerializeError::Io(io::Error::new(io::ErrorKind::InvalidInput, message))
}

// JSON has no literal for these.
fn non_finite(value: f64) -> &'static str {
    if value.is_nan() {
        "NaN"
    } else if value.is_sign_positive() {
        "Infinity"
    } else {
        "-Infinity"
    }
}

/// A [`TokenSink`] writing JSON text.
///
/// Layout is delegated to a `serde_json` [`Formatter`], so the output matches
/// `serde_json`'s compact or pretty printing. Binary is written as padded
/// base64 text and non-finite floats as the strings `"NaN"`, `"Infinity"`
/// and `"-Infinity"`.
pub struct JsonWriter<W, F = CompactFormatter> {
    writer: W,
    formatter: F,
    stack: Vec<Frame>,
}

impl<W: io::Write> JsonWriter<W> {
    #[inline]
    pub fn compact(writer: W) -> Self {
        Self::with_formatter(writer, CompactFormatter)
    }
}

impl<W: io::Write> JsonWriter<W, PrettyFormatter<'static>> {
    #[inline]
    pub fn pretty(writer: W) -> Self {
        Self::with_formatter(writer, PrettyFormatter::new())
    }
}

impl<W: io::Write, F: Formatter> JsonWriter<W, F> {
    #[inline]
    pub fn with_formatter(writer: W, formatter: F) -> Self {
        Self {
            writer,
            formatter,
            stack: Vec::new(),
        }
    }

    /// The underlying writer.
    #[inline]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn begin_value(&mut self) -> Result<(), SerializeError> {
        match self.stack.last_mut() {
            None => {}
            Some(frame) if frame.container == Container::Array => {
                self.formatter.begin_array_value(&mut self.writer, frame.first)?;
                frame.first = false;
            }
            Some(frame) => {
                if !frame.named {
                    return Err(misuse("object value without a field name"));
                }
                self.formatter.begin_object_value(&mut self.writer)?;
            }
        }
        Ok(())
    }

    fn end_value(&mut self) -> Result<(), SerializeError> {
        match self.stack.last_mut() {
            None => {}
            Some(frame) if frame.container == Container::Array => {
                self.formatter.end_array_value(&mut self.writer)?;
            }
            Some(frame) => {
                frame.named = false;
                self.formatter.end_object_value(&mut self.writer)?;
            }
        }
        Ok(())
    }

    fn scalar(&mut self, write: impl FnOnce(&mut F, &mut W) -> io::Result<()>) -> Result<(), SerializeError> {
        self.begin_value()?;
        write(&mut self.formatter, &mut self.writer)?;
        self.end_value()
    }

    fn escaped(formatter: &mut F, writer: &mut W, value: &str) -> io::Result<()> {
        formatter.begin_string(writer)?;

        let bytes = value.as_bytes();
        let mut start = 0;
        for (index, &byte) in bytes.iter().enumerate() {
            let escape = match byte {
                b'"' => CharEscape::Quote,
                b'\\' => CharEscape::ReverseSolidus,
                b'\x08' => CharEscape::Backspace,
                b'\x0c' => CharEscape::FormFeed,
                b'\n' => CharEscape::LineFeed,
                b'\r' => CharEscape::CarriageReturn,
                b'\t' => CharEscape::Tab,
                0x00..=0x1f => CharEscape::AsciiControl(byte),
                _ => continue,
            };
            // Escaped bytes are ASCII, so `start..index` is on char boundaries.
            if start < index {
                formatter.write_string_fragment(writer, &value[start..index])?;
            }
            formatter.write_char_escape(writer, escape)?;
            start = index + 1;
        }
        if start < bytes.len() {
            formatter.write_string_fragment(writer, &value[start..])?;
        }

        formatter.end_string(writer)
    }

    fn close(&mut self, container: Container) -> Result<(), SerializeError> {
        match self.stack.last() {
            Some(frame) if frame.container == container && !frame.named => {}
            _ => return Err(misuse("unbalanced container end")),
        }
        self.stack.pop();
        match container {
            Container::Array => self.formatter.end_array(&mut self.writer)?,
            Container::Object => self.formatter.end_object(&mut self.writer)?,
        }
        self.end_value()
    }
}

impl<W: io::Write, F: Formatter> TokenSink for JsonWriter<W, F> {
    fn write_null(&mut self) -> Result<(), SerializeError> {
        self.scalar(|f, w| f.write_null(w))
    }

    fn write_bool(&mut self, value: bool) -> Result<(), SerializeError> {
        self.scalar(|f, w| f.write_bool(w, value))
    }

    fn write_str(&mut self, value: &str) -> Result<(), SerializeError> {
        self.scalar(|f, w| Self::escaped(f, w, value))
    }

    fn write_i64(&mut self, value: i64) -> Result<(), SerializeError> {
        self.scalar(|f, w| f.write_i64(w, value))
    }

    fn write_i128(&mut self, value: i128) -> Result<(), SerializeError> {
        self.scalar(|f, w| f.write_i128(w, value))
    }

    fn write_f32(&mut self, value: f32) -> Result<(), SerializeError> {
        if value.is_finite() {
            self.scalar(|f, w| f.write_f32(w, value))
        } else {
            self.write_str(non_finite(f64::from(value)))
        }
    }

    fn write_f64(&mut self, value: f64) -> Result<(), SerializeError> {
        if value.is_finite() {
            self.scalar(|f, w| f.write_f64(w, value))
        } else {
            self.write_str(non_finite(value))
        }
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<(), SerializeError> {
        let encoded = STANDARD.encode(value);
        self.write_str(&encoded)
    }

    fn write_start_array(&mut self, _: Option<usize>) -> Result<(), SerializeError> {
        self.begin_value()?;
        self.formatter.begin_array(&mut self.writer)?;
        self.stack.push(Frame {
            container: Container::Array,
            first: true,
            named: false,
        });
        Ok(())
    }

    fn write_end_array(&mut self) -> Result<(), SerializeError> {
        self.close(Container::Array)
    }

    fn write_start_object(&mut self, _: Option<usize>) -> Result<(), SerializeError> {
        self.begin_value()?;
        self.formatter.begin_object(&mut self.writer)?;
        self.stack.push(Frame {
            container: Container::Object,
            first: true,
            named: false,
        });
        Ok(())
    }

    fn write_field_name(&mut self, name: &str) -> Result<(), SerializeError> {
        let Some(frame) = self.stack.last_mut() else {
            return Err(misuse("field name outside an object"));
        };
        if frame.container != Container::Object || frame.named {
            return Err(misuse("unexpected field name"));
        }
        self.formatter.begin_object_key(&mut self.writer, frame.first)?;
        frame.first = false;
        frame.named = true;

        Self::escaped(&mut self.formatter, &mut self.writer, name)?;
        self.formatter.end_object_key(&mut self.writer)?;
        Ok(())
    }

    fn write_end_object(&mut self) -> Result<(), SerializeError> {
        self.close(Container::Object)
    }
}

// -----------------------------------------------------------------------------
// Tests
