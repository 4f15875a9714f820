//! harspec Core Library
//!
//! This library converts captured browser network traces (HAR files) into
//! OpenAPI 3.1 documents: it filters the capture down to the target
//! service's traffic, synthesizes one operation per accepted exchange, and
//! emits a deterministic, secret-free JSON description.

pub mod blocklist;
pub mod config;
pub mod error;
pub mod generate;
pub mod har;
pub mod openapi;
pub mod processor;

pub use crate::{
    config::GenerateConfig,
    error::{Error, Result},
    generate::{generate, GenerateOutput},
    har::HarDocument,
    openapi::OpenApiDocument,
    processor::Processor,
};
