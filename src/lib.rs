pub mod constants;
pub mod debug_log;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod physics;
pub mod scanner;
pub mod selection;
pub mod session;
pub mod tracing_sub;

pub use drivers::{Overlay, PointerState, WindowSystem};
pub use error::WindowError;
pub use event_loop::{ControlFlow, StepLoop};
pub use geometry::Rect;
pub use session::Session;
