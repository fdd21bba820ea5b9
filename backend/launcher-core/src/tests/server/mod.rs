mod command;
mod spawn;
