pub mod pagination;
pub mod store;
pub mod theaters;

pub use pagination::Page;
pub use store::{CatalogStore, MovieWithTheaters};
pub use theaters::TheaterJoin;
