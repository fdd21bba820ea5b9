mod port;
mod process;
