pub mod context;
pub mod lifecycle;
pub mod surface;

pub use context::SessionContext;
pub use lifecycle::{HostPage, LifecycleController, LifecycleState, Transition};
pub use surface::{CrownVariant, JumpMenu, MenuEntry, build_surface};
