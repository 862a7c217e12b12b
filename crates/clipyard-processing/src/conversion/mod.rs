//! Video conversion: fetch a source object, run the external cropper, store the result.

mod converter;
mod orchestrator;

pub use converter::{ConverterError, ExternalConverter, ProcessOutput};
pub use orchestrator::{
    derive_output_key, ConversionError, ConversionOrchestrator, ConversionOutcome,
    ConversionStage, SUCCESS_MESSAGE,
};
