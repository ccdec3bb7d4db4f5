pub mod allowlist;
pub mod config;
pub mod connection;
pub mod content;
pub mod exception;
pub mod param;
pub mod request;
pub mod response;
pub mod router;
pub mod server;
pub mod util;

pub use allowlist::{AddressAllowlist, AddressMaskEntry};
pub use config::Config;
pub use connection::ConnectionHandler;
pub use content::ContentSource;
pub use exception::Exception;
pub use request::Route;
pub use response::{Clock, Response, ResponseStatus, SystemClock};
pub use router::{Handled, LoopOutcome, Router};
pub use server::Acceptor;
