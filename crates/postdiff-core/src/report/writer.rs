//! Report transport contract.

use crate::errors::{PostDiffError, Result};

/// Sink for a report expressed as counted arrays and maps.
///
/// Arrays commit to their element count and maps to their field count at
/// open time. Implementations must reject a member beyond the declared count
/// and a close before the count is reached.
pub trait ReportWriter {
    /// # Errors
    ///
    /// `OutputProtocol` if no value is expected here, or a transport failure.
    fn open_array(&mut self, len: usize) -> Result<()>;

    /// # Errors
    ///
    /// `OutputProtocol` if no value is expected here, or a transport failure.
    fn open_map(&mut self, n_fields: usize) -> Result<()>;

    /// Field name inside the innermost map
    ///
    /// # Errors
    ///
    /// `OutputProtocol` outside a map, on a second key in a row, or past the
    /// declared field count.
    fn key(&mut self, key: &str) -> Result<()>;

    /// # Errors
    ///
    /// `OutputProtocol` if no value is expected here, or a transport failure.
    fn uint(&mut self, value: u64) -> Result<()>;

    /// # Errors
    ///
    /// `OutputProtocol` if no value is expected here, or a transport failure.
    fn int(&mut self, value: i64) -> Result<()>;

    /// # Errors
    ///
    /// `OutputProtocol` if no value is expected here, or a transport failure.
    fn text(&mut self, value: &str) -> Result<()>;

    /// # Errors
    ///
    /// `OutputProtocol` if no value is expected here, or a transport failure.
    fn null(&mut self) -> Result<()>;

    /// # Errors
    ///
    /// `OutputProtocol` if the innermost container is not a complete array.
    fn close_array(&mut self) -> Result<()>;

    /// # Errors
    ///
    /// `OutputProtocol` if the innermost container is not a complete map.
    fn close_map(&mut self) -> Result<()>;
}

/// Where the value about to be written lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The single top-level value
    Root,
    /// Element `n` (zero-based) of the innermost array
    Element(usize),
    /// Value for the key just written
    FieldValue,
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    Array {
        declared: usize,
        written: usize,
    },
    Map {
        declared: usize,
        written: usize,
        awaiting_value: bool,
    },
}

/// Bookkeeping shared by writers: the stack of open containers and how many
/// members each has received.
#[derive(Debug, Default)]
pub struct ContainerStack {
    frames: Vec<Frame>,
    root_written: bool,
}

impl ContainerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for a value (scalar or container) about to be written.
    ///
    /// # Errors
    ///
    /// `OutputProtocol` if the innermost array is full, a map value has no
    /// key, or a second top-level value is written.
    pub fn begin_value(&mut self) -> Result<Slot> {
        match self.frames.last_mut() {
            None if self.root_written => Err(protocol("a report has a single top-level value")),
            None => {
                self.root_written = true;
                Ok(Slot::Root)
            }
            Some(Frame::Array { declared, written }) => {
                if *written == *declared {
                    return Err(protocol(format!(
                        "array declared {} elements, got more",
                        declared
                    )));
                }
                *written += 1;
                Ok(Slot::Element(*written - 1))
            }
            Some(Frame::Map { awaiting_value, .. }) => {
                if !*awaiting_value {
                    return Err(protocol("map value written without a key"));
                }
                *awaiting_value = false;
                Ok(Slot::FieldValue)
            }
        }
    }

    /// Account for a map key; returns the field's zero-based index.
    ///
    /// # Errors
    ///
    /// `OutputProtocol` outside a map, after another key, or past the
    /// declared field count.
    pub fn begin_key(&mut self) -> Result<usize> {
        match self.frames.last_mut() {
            Some(Frame::Map {
                declared,
                written,
                awaiting_value,
            }) => {
                if *awaiting_value {
                    return Err(protocol("map key written while a value is pending"));
                }
                if *written == *declared {
                    return Err(protocol(format!(
                        "map declared {} fields, got more",
                        declared
                    )));
                }
                *written += 1;
                *awaiting_value = true;
                Ok(*written - 1)
            }
            _ => Err(protocol("map key written outside a map")),
        }
    }

    pub fn push_array(&mut self, len: usize) {
        self.frames.push(Frame::Array {
            declared: len,
            written: 0,
        });
    }

    pub fn push_map(&mut self, n_fields: usize) {
        self.frames.push(Frame::Map {
            declared: n_fields,
            written: 0,
            awaiting_value: false,
        });
    }

    /// # Errors
    ///
    /// `OutputProtocol` if the innermost container is not an array holding
    /// its declared element count.
    pub fn pop_array(&mut self) -> Result<()> {
        match self.frames.last().copied() {
            Some(Frame::Array { declared, written }) if declared == written => {
                self.frames.pop();
                Ok(())
            }
            Some(Frame::Array { declared, written }) => Err(protocol(format!(
                "array declared {} elements, closed after {}",
                declared, written
            ))),
            _ => Err(protocol("close_array without an open array")),
        }
    }

    /// # Errors
    ///
    /// `OutputProtocol` if the innermost container is not a map holding its
    /// declared field count.
    pub fn pop_map(&mut self) -> Result<()> {
        match self.frames.last().copied() {
            Some(Frame::Map {
                declared,
                written,
                awaiting_value: false,
            }) if declared == written => {
                self.frames.pop();
                Ok(())
            }
            Some(Frame::Map {
                awaiting_value: true,
                ..
            }) => Err(protocol("map closed while a value is pending")),
            Some(Frame::Map {
                declared, written, ..
            }) => Err(protocol(format!(
                "map declared {} fields, closed after {}",
                declared, written
            ))),
            _ => Err(protocol("close_map without an open map")),
        }
    }

    /// Number of open containers
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True once a top-level value has been written and every container closed
    pub fn is_complete(&self) -> bool {
        self.root_written && self.frames.is_empty()
    }

    /// # Errors
    ///
    /// `OutputProtocol` unless [`ContainerStack::is_complete`].
    pub fn ensure_complete(&self) -> Result<()> {
        if self.is_complete() {
            Ok(())
        } else if !self.root_written {
            Err(protocol("report is empty"))
        } else {
            Err(protocol(format!(
                "report incomplete: {} container(s) still open",
                self.frames.len()
            )))
        }
    }
}

fn protocol(reason: impl Into<String>) -> crate::errors::ExError {
    PostDiffError::OutputProtocol {
        reason: reason.into(),
    }
    .into()
}
