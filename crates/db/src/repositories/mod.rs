//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application.

pub mod category;
pub mod movement;
pub mod operation;
pub mod party;
pub mod payable;
pub mod project;
pub mod sync_checkpoint;

pub use category::{CategoryError, CategoryRepository};
pub use movement::{MovementError, MovementRepository};
pub use operation::{OperationError, OperationRepository};
pub use party::{PartyError, PartyRepository};
pub use payable::{PayableError, PayableRepository};
pub use project::{ProjectError, ProjectRepository};
pub use sync_checkpoint::{CheckpointError, SyncCheckpointRepository};
