mod fake_window;
mod lifecycle;
mod links;
