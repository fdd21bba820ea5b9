// Library exports for testing
// The binary (main.rs) imports these as well

pub mod error;
pub mod launcher;
pub mod logger;
pub mod state;
pub mod window;

#[cfg(test)]
mod tests;
