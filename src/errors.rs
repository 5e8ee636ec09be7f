use std::{io, num::{ParseFloatError, ParseIntError}, str::Utf8Error};
use quick_xml::events::attributes::AttrError;
use thiserror::Error;

use crate::data::osm::OsmId;

/// Failures while turning an event stream into a map. Any of these aborts the load.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestError {
    #[error("way references undeclared node {0}")]
    UnresolvedReference(OsmId),
    #[error("node {0} declared twice with different coordinates")]
    DuplicateId(OsmId),
    #[error("way {0} started while another way is still open")]
    AlreadyInProgress(OsmId),
    #[error("way content outside of a way")]
    NoFeatureInProgress,
    #[error("way {0} has no nodes")]
    EmptyFeature(OsmId),
    #[error("way {0} declared twice")]
    DuplicateFeature(OsmId),
    #[error("extent declared after the index was built")]
    AlreadyInitialized,
    #[error("way {0} added before the index was built")]
    NotInitialized(OsmId),
    #[error("input ended inside way {0}")]
    UnfinishedFeature(OsmId),
    #[error(transparent)]
    Index(#[from] IndexError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("feature {0} has no points")]
    InvalidFeature(OsmId),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("no feature with id {0}")]
    NotFound(OsmId),
}

#[derive(Debug)]
pub struct Error {
    pub message: String,
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(value: quick_xml::Error) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<ParseFloatError> for Error {
    fn from(value: ParseFloatError) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<ParseIntError> for Error {
    fn from(value: ParseIntError) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<AttrError> for Error {
    fn from(value: AttrError) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<Utf8Error> for Error {
    fn from(value: Utf8Error) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<regex::Error> for Error {
    fn from(value: regex::Error) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<IngestError> for Error {
    fn from(value: IngestError) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<StoreError> for Error {
    fn from(value: StoreError) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error {
            message: value
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
