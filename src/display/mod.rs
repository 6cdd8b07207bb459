mod cursor;
mod lanes;
mod renderer;
mod report;
mod text;

pub use cursor::HiddenCursor;
pub use lanes::Lanes;
pub use renderer::LiveRenderer;
pub use report::RunState;
pub use text::{ELLIPSIS, headline, truncate};
