pub mod functions;
pub mod meta;
