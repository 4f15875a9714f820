//! End-to-end generation: load a capture, convert it, write the document.

// Internal imports (std, crate)
use std::path::PathBuf;

use crate::{
    config::GenerateConfig,
    error::Result,
    har::HarDocument,
    openapi::OpenApiDocument,
    processor::Processor,
};

// External imports (alphabetized)
use tokio::fs;
use tokio_util::sync::CancellationToken;

/// Example value substituted for captured `Authorization` headers so bearer
/// tokens never end up in a generated document.
const AUTHORIZATION_EXAMPLE: &str = "Bearer {{BearerAdmin}}";

/// What a successful run produced.
#[derive(Debug)]
pub struct GenerateOutput {
    /// Where the serialized document was written
    pub output_path: PathBuf,
    /// The in-memory document model
    pub document: OpenApiDocument,
    /// Size of the serialized payload in bytes
    pub payload_len: usize,
}

/// Main entry point for document generation
pub async fn generate(
    cancel: &CancellationToken,
    config: &GenerateConfig,
) -> Result<GenerateOutput> {
    // 1. Load the capture
    let har = HarDocument::from_file(cancel, &config.har_path).await?;

    // 2. Configure the processor; the header rule is registered up front and
    //    the configuration is immutable for the rest of the run
    let mut processor = Processor::new(&config.domains);
    processor.allow_header("Authorization", AUTHORIZATION_EXAMPLE);

    // 3. Convert, then write only after the full entry set was processed
    let (payload, document) = processor.generate(cancel, &har)?;

    let output_path = config.resolved_output_path();
    fs::write(&output_path, &payload).await?;

    log::info!(
        "wrote {} paths to {}",
        document.paths.len(),
        output_path.display()
    );

    Ok(GenerateOutput {
        output_path,
        payload_len: payload.len(),
        document,
    })
}
