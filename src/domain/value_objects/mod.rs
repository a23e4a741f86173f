pub mod bearer_token;
pub mod operation;
pub mod pending_action;
pub mod resource_path;
pub mod temp_id;

pub use bearer_token::BearerToken;
pub use operation::Operation;
pub use pending_action::PendingAction;
pub use resource_path::ResourcePath;
pub use temp_id::TempId;
