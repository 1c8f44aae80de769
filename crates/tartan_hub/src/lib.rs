pub mod client;
pub mod config;
pub mod console;
pub mod house;
pub mod protocol;
pub mod server;
pub mod user;

pub use client::HubClient;
pub use config::Args;
pub use config::Config;
pub use config::LogLevel;
pub use console::Console;
pub use console::Terminal;
pub use house::FieldKey;
pub use house::House;
pub use house::HouseState;
pub use server::Server;
pub use server::ServerError;
pub use user::UserActor;
