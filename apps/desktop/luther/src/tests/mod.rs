mod error;
mod launcher;
