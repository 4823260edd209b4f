//! Test doubles shared by unit and integration tests.

mod mock_processor;

pub use mock_processor::{MockProcessor, RecordedCall};
