//! The globe viewer application: window and event loop, fixed-rate frame
//! loop, mouse input and orbit camera controls.

pub mod frame_loop;
pub mod mouse;
pub mod orbit;
pub mod window;

pub use frame_loop::{FIXED_DT, FrameLoop, MAX_FRAME_TIME};
pub use mouse::MouseState;
pub use orbit::OrbitControls;
pub use window::{AppState, SetupError, run};
