//! Job information management.

pub mod information;

pub use information::JobInformationService;
