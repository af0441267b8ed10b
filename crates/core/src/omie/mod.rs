//! Omie ERP resource catalog and record decoding.
//!
//! The ERP exposes paginated listing calls whose response envelopes and
//! field spellings vary by endpoint and API generation. This module keeps
//! all of that knowledge in one place:
//!
//! - `resource` - which endpoint/call serves each resource, how its pages
//!   are parameterized, and how to extract the result array
//! - `decode` - tolerant typed decoders turning raw JSON records into
//!   storage-ready records via explicit field compatibility tables
//! - `record` - the typed records produced by the decoders

pub mod decode;
pub mod record;
pub mod resource;

pub use record::{CategoryRecord, MovementRecord, PartyRecord, PayableRecord, ProjectRecord};
pub use resource::{ExtractionPath, OmieResource};
