//! Core system types and foundations
//!
//! This module contains the fundamental building blocks of polygon-graph,
//! including feature types, error handling and configuration.

pub mod types;
pub mod error;
pub mod config;

// Re-export commonly used items
pub use types::{AttributeValue, Attributes, Feature, FeatureId, FloatKey, GroupKey, Layer};
pub use error::{Error, GeometryError, Result, SerializationError};
pub use config::{Config, NullPolicy, OutputFormat, TouchSemantics};
