//! Publication request entities and the workflow state machine.

pub mod model;
pub mod staged;
pub mod status;

pub use model::{FileRequest, RequestType};
pub use staged::RequestAsset;
pub use status::RequestStatus;
