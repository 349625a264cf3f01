pub mod drag;
pub mod touch;
pub mod viewport;

pub use drag::DragState;
pub use touch::TouchState;
pub use viewport::Viewport;
