pub mod config;
pub mod error;
pub mod ids;
pub mod logging;
pub mod model;

pub use config::{BackendConfig, ChatConfig, Config, ConfigError, FileLoggingConfig, LoggingSection};
pub use error::{ConversationError, Error, Result};
pub use ids::{ConversationId, DocumentId, MessageId, ProjectId};
pub use model::{
    Citation, ConversationSnapshot, DeliveryState, Document, Message, Project, ProjectPatch, Reply, Role,
};
