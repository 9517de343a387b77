// Daily bars and aggregation
pub mod market;

// Feature schema and classifier capabilities
pub mod ml;

// Signals, results and return blending
pub mod prediction;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
