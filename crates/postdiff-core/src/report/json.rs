//! JSON report writers.
//!
//! [`JsonTreeWriter`] buffers the whole report as a `serde_json::Value` and
//! only hands it out once every container is closed. [`JsonStreamWriter`]
//! writes straight through to an `io::Write`; a failed build leaves partial
//! output behind, which the caller must treat as invalid.

use crate::errors::{ExError, PostDiffError, Result};
use crate::report::writer::{ContainerStack, ReportWriter, Slot};
use serde_json::{Map, Value};
use std::io::Write;

enum Node {
    Array(Vec<Value>),
    Map {
        fields: Map<String, Value>,
        pending_key: Option<String>,
    },
}

/// Writer that builds an in-memory JSON tree
#[derive(Default)]
pub struct JsonTreeWriter {
    stack: ContainerStack,
    nodes: Vec<Node>,
    root: Option<Value>,
}

impl JsonTreeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the finished report.
    ///
    /// # Errors
    ///
    /// `OutputProtocol` if nothing was written or containers are still open;
    /// the partial tree is discarded.
    pub fn finish(self) -> Result<Value> {
        self.stack.ensure_complete()?;
        self.root.ok_or_else(|| {
            PostDiffError::Internal {
                message: "complete report without a root value".to_string(),
            }
            .into()
        })
    }

    fn place(&mut self, value: Value) -> Result<()> {
        match self.nodes.last_mut() {
            None => {
                self.root = Some(value);
                Ok(())
            }
            Some(Node::Array(items)) => {
                items.push(value);
                Ok(())
            }
            Some(Node::Map {
                fields,
                pending_key,
            }) => {
                let key = pending_key
                    .take()
                    .ok_or_else(|| protocol("map value without a key"))?;
                fields.insert(key, value);
                Ok(())
            }
        }
    }

    fn scalar(&mut self, value: Value) -> Result<()> {
        self.stack.begin_value()?;
        self.place(value)
    }
}

impl ReportWriter for JsonTreeWriter {
    fn open_array(&mut self, len: usize) -> Result<()> {
        self.stack.begin_value()?;
        self.stack.push_array(len);
        self.nodes.push(Node::Array(Vec::with_capacity(len)));
        Ok(())
    }

    fn open_map(&mut self, n_fields: usize) -> Result<()> {
        self.stack.begin_value()?;
        self.stack.push_map(n_fields);
        self.nodes.push(Node::Map {
            fields: Map::new(),
            pending_key: None,
        });
        Ok(())
    }

    fn key(&mut self, key: &str) -> Result<()> {
        self.stack.begin_key()?;
        match self.nodes.last_mut() {
            Some(Node::Map {
                fields,
                pending_key,
            }) => {
                if fields.contains_key(key) {
                    return Err(protocol(format!("duplicate map key <{}>", key)));
                }
                *pending_key = Some(key.to_string());
                Ok(())
            }
            _ => Err(protocol("map key written outside a map")),
        }
    }

    fn uint(&mut self, value: u64) -> Result<()> {
        self.scalar(Value::from(value))
    }

    fn int(&mut self, value: i64) -> Result<()> {
        self.scalar(Value::from(value))
    }

    fn text(&mut self, value: &str) -> Result<()> {
        self.scalar(Value::from(value))
    }

    fn null(&mut self) -> Result<()> {
        self.scalar(Value::Null)
    }

    fn close_array(&mut self) -> Result<()> {
        self.stack.pop_array()?;
        match self.nodes.pop() {
            Some(Node::Array(items)) => self.place(Value::Array(items)),
            _ => Err(protocol("close_array without an open array")),
        }
    }

    fn close_map(&mut self) -> Result<()> {
        self.stack.pop_map()?;
        match self.nodes.pop() {
            Some(Node::Map { fields, .. }) => self.place(Value::Object(fields)),
            _ => Err(protocol("close_map without an open map")),
        }
    }
}

/// Writer that streams compact JSON to an `io::Write`
pub struct JsonStreamWriter<W: Write> {
    stack: ContainerStack,
    out: W,
}

impl<W: Write> JsonStreamWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            stack: ContainerStack::new(),
            out,
        }
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    ///
    /// `OutputProtocol` if the report is incomplete, `Io` if flushing fails.
    pub fn finish(mut self) -> Result<W> {
        self.stack.ensure_complete()?;
        self.out.flush()?;
        Ok(self.out)
    }

    fn separator(&mut self, slot: Slot) -> Result<()> {
        if let Slot::Element(index) = slot {
            if index > 0 {
                self.out.write_all(b",")?;
            }
        }
        Ok(())
    }

    fn scalar<T: serde::Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let slot = self.stack.begin_value()?;
        self.separator(slot)?;
        serde_json::to_writer(&mut self.out, value).map_err(ExError::from)
    }
}

impl<W: Write> ReportWriter for JsonStreamWriter<W> {
    fn open_array(&mut self, len: usize) -> Result<()> {
        let slot = self.stack.begin_value()?;
        self.separator(slot)?;
        self.stack.push_array(len);
        self.out.write_all(b"[")?;
        Ok(())
    }

    fn open_map(&mut self, n_fields: usize) -> Result<()> {
        let slot = self.stack.begin_value()?;
        self.separator(slot)?;
        self.stack.push_map(n_fields);
        self.out.write_all(b"{")?;
        Ok(())
    }

    fn key(&mut self, key: &str) -> Result<()> {
        let index = self.stack.begin_key()?;
        if index > 0 {
            self.out.write_all(b",")?;
        }
        serde_json::to_writer(&mut self.out, key)?;
        self.out.write_all(b":")?;
        Ok(())
    }

    fn uint(&mut self, value: u64) -> Result<()> {
        self.scalar(&value)
    }

    fn int(&mut self, value: i64) -> Result<()> {
        self.scalar(&value)
    }

    fn text(&mut self, value: &str) -> Result<()> {
        self.scalar(value)
    }

    fn null(&mut self) -> Result<()> {
        self.scalar(&())
    }

    fn close_array(&mut self) -> Result<()> {
        self.stack.pop_array()?;
        self.out.write_all(b"]")?;
        Ok(())
    }

    fn close_map(&mut self) -> Result<()> {
        self.stack.pop_map()?;
        self.out.write_all(b"}")?;
        Ok(())
    }
}

fn protocol(reason: impl Into<String>) -> ExError {
    PostDiffError::OutputProtocol {
        reason: reason.into(),
    }
    .into()
}
