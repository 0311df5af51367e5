mod repo;
mod schema;

pub use repo::BoardRepo;
pub use schema::init_database;
