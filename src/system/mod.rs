//! System utilities and monitoring
//!
//! This module contains the Prometheus metrics of the transform.

pub mod metrics;
