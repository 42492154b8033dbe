mod dbtime;
mod ids;

pub use dbtime::{from_db_date, from_db_time, to_db_date, to_db_time};
pub use ids::{is_valid_id, new_id};
