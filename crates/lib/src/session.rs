//! # Host Session
//!
//! The processor never owns records. It borrows them from a host through the
//! [`ProcessSession`] trait: take the next record, read its content, write
//! attributes back and route it to a relationship. [`MemorySession`] is a
//! self-contained host used by the CLI and by tests.

use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::io::{self, Cursor, Read};
use uuid::Uuid;

/// One record moving through the pipeline: an identity plus its attributes.
/// The content lives with the session and is read through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowFile {
    pub id: Uuid,
    pub attributes: HashMap<String, String>,
}

impl FlowFile {
    pub fn new(attributes: HashMap<String, String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            attributes,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// The two outcomes a record can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Success,
    Failure,
}

impl Relationship {
    pub fn name(&self) -> &'static str {
        match self {
            Relationship::Success => "success",
            Relationship::Failure => "failure",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Relationship::Success => "Successfully determined image.",
            Relationship::Failure => "Failed to determine image.",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The host-side operations the processor relies on.
pub trait ProcessSession: Send {
    /// Takes the next queued record, if any.
    fn get(&mut self) -> Option<FlowFile>;

    /// Opens the content of a record for reading.
    fn read(&mut self, flow_file: &FlowFile) -> io::Result<Box<dyn Read + Send + '_>>;

    /// Adds or replaces attributes on a record and returns the updated record.
    fn put_all_attributes(
        &mut self,
        flow_file: FlowFile,
        attributes: HashMap<String, String>,
    ) -> FlowFile;

    /// Hands the record over to a relationship. Called exactly once per record.
    fn transfer(&mut self, flow_file: FlowFile, relationship: Relationship);
}

/// An in-memory session: a queue of records and the records routed so far.
#[derive(Debug, Default)]
pub struct MemorySession {
    queue: VecDeque<FlowFile>,
    contents: HashMap<Uuid, Vec<u8>>,
    transferred: Vec<(FlowFile, Relationship)>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a record with the given content and attributes, returning its id.
    pub fn enqueue(&mut self, content: Vec<u8>, attributes: HashMap<String, String>) -> Uuid {
        let flow_file = FlowFile::new(attributes);
        let id = flow_file.id;
        self.contents.insert(id, content);
        self.queue.push_back(flow_file);
        id
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Every record routed so far, in routing order.
    pub fn transferred(&self) -> &[(FlowFile, Relationship)] {
        &self.transferred
    }

    /// The records routed to one relationship, in routing order.
    pub fn flow_files_for(&self, relationship: Relationship) -> Vec<&FlowFile> {
        self.transferred
            .iter()
            .filter(|(_, r)| *r == relationship)
            .map(|(flow_file, _)| flow_file)
            .collect()
    }
}

impl ProcessSession for MemorySession {
    fn get(&mut self) -> Option<FlowFile> {
        self.queue.pop_front()
    }

    fn read(&mut self, flow_file: &FlowFile) -> io::Result<Box<dyn Read + Send + '_>> {
        let content = self.contents.get(&flow_file.id).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no content for record {}", flow_file.id),
            )
        })?;
        Ok(Box::new(Cursor::new(content.as_slice())))
    }

    fn put_all_attributes(
        &mut self,
        mut flow_file: FlowFile,
        attributes: HashMap<String, String>,
    ) -> FlowFile {
        flow_file.attributes.extend(attributes);
        flow_file
    }

    fn transfer(&mut self, flow_file: FlowFile, relationship: Relationship) {
        self.transferred.push((flow_file, relationship));
    }
}
