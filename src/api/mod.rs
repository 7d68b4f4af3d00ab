pub mod client;
pub mod http;
#[cfg(test)]
pub mod mock;
pub mod types;
