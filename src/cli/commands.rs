pub mod initdb;
pub mod materialize;
pub mod schedule;
pub mod serve;

pub use initdb::init_database;
pub use materialize::materialize;
pub use schedule::print_schedule;
pub use serve::serve;
