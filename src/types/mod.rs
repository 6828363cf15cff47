pub mod encoding;
pub mod errors;
pub mod state;

pub use encoding::*;
pub use errors::*;
pub use state::*;
