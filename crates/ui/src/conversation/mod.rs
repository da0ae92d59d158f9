//! The conversation view: citation linking, message log, session and the
//! controller that ties them to the backend and the viewport.

pub mod citations;
pub mod controller;
pub mod log;
pub mod scroll;
pub mod session;

pub use citations::{CitationLabel, CitationLinker, LinkedText, Reference, Segment};
pub use controller::{ControllerEvent, ConversationController, ConversationStatus};
pub use log::{ExpansionState, MessageKey, MessageLog};
pub use scroll::{FollowState, MeasureSource, MeasureThrottle, ScrollDirective, ScrollFollow, Viewport};
pub use session::{ConversationSession, OpenTicket, SEND_FAILED_TEXT, SendTicket};
