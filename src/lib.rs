#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod feed;
pub mod formats;
pub mod front_matter;
pub mod generate;
pub mod indexer;
pub mod locale;
pub mod logging;
pub mod openai;
pub mod query;
pub mod render;
pub mod resolver;
pub mod slug;
pub mod slugs;
