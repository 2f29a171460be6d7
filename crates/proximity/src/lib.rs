pub mod controls;
pub mod filter;
pub mod record;
pub mod region;
pub mod render;
pub mod session;

pub use controls::*;
pub use filter::*;
pub use record::*;
pub use region::*;
pub use render::*;
pub use session::*;
