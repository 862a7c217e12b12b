//! Clipyard Processing Library
//!
//! The two service cores: the relocation engine that files objects into execution
//! folders, and the conversion orchestrator that runs the external autocrop
//! executable between a download and an upload.

pub mod conversion;
pub mod relocation;

pub use conversion::{
    derive_output_key, ConversionError, ConversionOrchestrator, ConversionOutcome,
    ConversionStage, ConverterError, ExternalConverter, ProcessOutput,
};
pub use relocation::{RelocationEngine, RelocationError, RelocationFailure};
