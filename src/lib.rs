pub mod client;
pub mod config;
pub mod models;
pub mod state;
#[cfg(test)]
pub mod test_helpers;
pub mod theme;
pub mod view;
