pub mod builds;
pub mod home;
pub mod resolve;
pub mod update;
pub mod util;

pub use builds::*;
pub use home::*;
pub use resolve::*;
pub use update::*;
pub use util::*;
