//! Streaming JSON generator.
//!
//! [`JsonWriter`] emits objects and string fields directly to an
//! [`std::io::Write`], keeping only one comma flag per open object. String escaping
//! is delegated to `serde_json`.

use std::io::Write;

use crate::error::EncodeError;

/// Token sink for the encoder.
#[derive(Debug)]
pub struct JsonWriter<W> {
    out: W,
    // One entry per open object: true once it has a member.
    open: Vec<bool>,
    root_written: bool,
}

impl<W: Write> JsonWriter<W> {
    /// Creates a writer over `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            open: Vec::new(),
            root_written: false,
        }
    }

    /// Number of currently open objects.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Starts a root object.
    ///
    /// Only valid at depth 0; inside an object use
    /// [`begin_object_field`](Self::begin_object_field).
    pub fn begin_object(&mut self) -> Result<(), EncodeError> {
        if !self.open.is_empty() {
            return Err(EncodeError::UnnamedObject {
                depth: self.open.len(),
            });
        }
        if self.root_written {
            // Concatenated documents are separated by a newline.
            self.out.write_all(b"\n")?;
        }
        self.out.write_all(b"{")?;
        self.open.push(false);
        self.root_written = true;
        Ok(())
    }

    /// Writes `"name":{` inside the current object.
    pub fn begin_object_field(&mut self, name: &str) -> Result<(), EncodeError> {
        self.member_name(name)?;
        self.out.write_all(b"{")?;
        self.open.push(false);
        Ok(())
    }

    /// Closes the innermost object.
    pub fn end_object(&mut self) -> Result<(), EncodeError> {
        if self.open.pop().is_none() {
            return Err(EncodeError::UnbalancedEnd);
        }
        self.out.write_all(b"}")?;
        Ok(())
    }

    /// Writes `"name":"value"` inside the current object.
    pub fn string_field(&mut self, name: &str, value: &str) -> Result<(), EncodeError> {
        self.member_name(name)?;
        self.write_str(value)
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> Result<(), EncodeError> {
        self.out.flush()?;
        Ok(())
    }

    /// Returns the underlying writer without flushing.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn member_name(&mut self, name: &str) -> Result<(), EncodeError> {
        let Some(has_members) = self.open.last_mut() else {
            return Err(EncodeError::FieldOutsideObject {
                name: name.to_string(),
            });
        };
        if *has_members {
            self.out.write_all(b",")?;
        }
        *has_members = true;
        self.write_str(name)?;
        self.out.write_all(b":")?;
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> Result<(), EncodeError> {
        serde_json::to_writer(&mut self.out, s).map_err(|e| EncodeError::Io(e.to_string()))
    }
}
