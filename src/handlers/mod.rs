pub mod create;
pub mod delete;
pub mod health;
pub mod list;
pub mod lookup;
pub mod root;
pub mod update;

#[cfg(test)]
pub mod test_support;

pub use create::create_handler;
pub use delete::delete_handler;
pub use health::health_handler;
pub use list::list_handler;
pub use lookup::lookup_handler;
pub use root::root_handler;
pub use update::{update_handler, update_without_date_handler};
