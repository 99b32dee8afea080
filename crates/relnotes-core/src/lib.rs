pub mod approval;
pub mod batch;
pub mod body;
pub mod chat;
pub mod config;
pub mod consolidate;
pub mod dates;
pub mod document;
pub mod error;
pub mod io;
pub mod layout;
pub mod matcher;
pub mod ordering;
pub mod paths;
pub mod preview;
pub mod publish;
pub mod snapshot;
pub mod tickets;
pub mod types;

pub use error::{RelnotesError, Result};
