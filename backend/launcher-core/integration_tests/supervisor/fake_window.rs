use launcher_core::error::window::WindowError;
use launcher_core::supervisor::WindowHost;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use url::Url;

/// Records every call the supervisor makes on its window.
#[derive(Default)]
pub struct FakeWindow {
    closed: AtomicBool,
    reject_navigation: AtomicBool,
    reveals: AtomicUsize,
    navigations: Mutex<Vec<Url>>,
    dialogs: Mutex<Vec<(String, String)>>,
    external: Mutex<Vec<Url>>,
}

impl FakeWindow {
    pub fn rejecting_navigation() -> Self {
        let window = Self::default();
        window.reject_navigation.store(true, Ordering::SeqCst);
        window
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn revealed(&self) -> bool {
        self.reveal_count() > 0
    }

    pub fn reveal_count(&self) -> usize {
        self.reveals.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> Vec<Url> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn dialogs(&self) -> Vec<(String, String)> {
        self.dialogs.lock().unwrap().clone()
    }

    pub fn external(&self) -> Vec<Url> {
        self.external.lock().unwrap().clone()
    }
}

impl WindowHost for FakeWindow {
    fn is_open(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    fn reveal(&self) -> Result<(), WindowError> {
        self.reveals.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn navigate(&self, url: &Url) -> Result<(), WindowError> {
        if self.reject_navigation.load(Ordering::SeqCst) {
            return Err(WindowError::Navigation {
                message: format!("Load rejected for {url}"),
                location: ErrorLocation::from(Location::caller()),
                source: None,
            });
        }

        self.navigations.lock().unwrap().push(url.clone());
        Ok(())
    }

    fn show_error(&self, title: &str, message: &str) {
        self.dialogs
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }

    fn open_external(&self, url: &Url) -> Result<(), WindowError> {
        self.external.lock().unwrap().push(url.clone());
        Ok(())
    }
}
