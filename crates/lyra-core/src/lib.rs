//! Lyra Core - Command-line intent
//!
//! This crate turns the player's command line into a typed [`Options`]
//! value, renders the help text, and encodes options for hand-off to an
//! already running instance.

pub mod codec;
pub mod help;
pub mod options;
pub mod parser;

pub use codec::{ decode, encode, DecodeError };
pub use help::HelpLabels;
pub use options::{ MediaUrl, Options, OptionsBuilder, PlayerAction, UrlListAction };
pub use parser::{ Invocation, OptionsParser, ParseError };
