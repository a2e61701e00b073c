// Test modules for embedwire crate
//
// Test organization follows the template pattern where each source file
// has a corresponding test file that focuses on business logic verification.

// Test helper utilities
pub mod helpers;

pub mod retry;


// NOTE: HTTP round-trip tests live in the integration test suite
// (tests/embedding_model_integration_tests.rs). They spin up wiremock
// servers and don't belong in unit tests.
