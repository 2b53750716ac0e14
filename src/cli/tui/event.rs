//! Terminal event polling for the board

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};

/// Board events
#[derive(Debug)]
pub enum Event {
    /// Key press
    Key(KeyEvent),
    /// No input within the tick rate; the board redraws, which also picks
    /// up terminal resizes
    Tick,
}

/// Polls the terminal on a background thread
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            let event = match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    // Key releases and repeats arrive on some platforms
                    Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        Event::Key(key)
                    }
                    Ok(_) => Event::Tick,
                    Err(_) => continue,
                },
                Ok(false) => Event::Tick,
                Err(_) => break,
            };

            // The receiver is gone once the board has closed
            if tx.send(event).is_err() {
                break;
            }
        });

        Self { rx }
    }

    /// Blocks until the next event
    pub fn next(&self) -> Result<Event> {
        Ok(self.rx.recv()?)
    }
}
