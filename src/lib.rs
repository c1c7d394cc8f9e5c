mod alias_string_ext;
mod codec;
mod config;
mod cookie;
mod error;
mod guest;
mod routes;
mod types;

pub use alias_string_ext::*;
pub use codec::*;
pub use config::*;
pub use cookie::*;
pub use error::*;
pub use guest::*;
pub use routes::*;
pub use types::*;

#[cfg(test)]
mod proptests;
