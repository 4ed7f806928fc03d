pub mod board;
pub mod error;
pub mod hashlife;
pub mod naive;
pub mod quadtree;
pub mod rule_set;

pub use board::Board;
pub use board::GolBoard;
pub use board::ROOT_LEVEL;
pub use error::Error;
pub use error::Result;
pub use hashlife::CacheStats;
pub use hashlife::HashLife;
pub use naive::NaiveBoard;
pub use rule_set::RuleSet;
pub use rule_set::B3S23;
