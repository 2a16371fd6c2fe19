//! Error type shared by every fallible core operation.
//!
//! Caller errors (bad handle ids, refused connections) and data errors
//! (malformed `.dia` input) are returned, never panicked on. Degenerate
//! geometry is not an error and never reaches this type.

use crate::handle::HandleId;
use crate::id::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiaError {
    /// `move_handle` was called with a handle the object does not own.
    #[error("{object}: handle {handle:?} is not valid for this object")]
    InvalidHandle {
        object: &'static str,
        handle: HandleId,
    },

    #[error("a connection needs at least 2 handles, got {0}")]
    TooFewHandles(usize),

    #[error("{object}: handle {handle} is not connectable")]
    NotConnectable { object: ObjectId, handle: usize },

    #[error("{0}: an object cannot connect to its own connection points")]
    SelfConnection(ObjectId),

    #[error("no object with id {0}")]
    UnknownObject(ObjectId),

    #[error("{object} has no handle #{index}")]
    NoSuchHandle { object: ObjectId, index: usize },

    #[error("{object} has no connection point #{index}")]
    NoSuchConnectionPoint { object: ObjectId, index: usize },

    #[error("unknown object type `{0}`")]
    UnknownType(String),

    #[error("an object with id {0} already exists")]
    DuplicateObject(ObjectId),

    #[error("malformed {kind} data: {detail}")]
    MalformedData { kind: &'static str, detail: String },

    #[error("<{element}> is missing attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("document root is not <dia:diagram>")]
    NotADiagram,

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("xml attribute: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl DiaError {
    pub(crate) fn malformed(kind: &'static str, detail: impl Into<String>) -> Self {
        DiaError::MalformedData {
            kind,
            detail: detail.into(),
        }
    }
}

pub type DiaResult<T> = Result<T, DiaError>;
