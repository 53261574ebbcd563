pub mod errors;
pub mod events;
pub mod filename;
pub mod http_client;
pub mod processor;
pub mod queue;
pub mod selection;
pub mod sink;
pub mod status;
pub mod url_parser;
