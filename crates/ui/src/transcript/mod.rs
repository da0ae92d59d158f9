mod renderer;

pub use renderer::{TranscriptRenderer, content_width};
