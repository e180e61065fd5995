pub mod normalize;
pub mod table;

pub use normalize::{normalize, Dataset, ProjectRecord};
pub use table::RawTable;
