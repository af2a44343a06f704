pub mod analysis;
pub mod api_football;
pub mod catalog;
pub mod composer;
pub mod render;
pub mod session;
pub mod synthesizer;

pub use analysis::*;
pub use api_football::ApiFootballCatalog;
pub use catalog::*;
pub use composer::*;
pub use render::*;
pub use session::*;
pub use synthesizer::*;
