pub mod connection;
pub mod introspect;

pub use connection::MySqlConnection;
pub use introspect::fetch_names;
