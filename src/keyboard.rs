//! Windows samples the global async key state; elsewhere commands come from stdin.

use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use log::debug;

use crate::input::{InputEvent, InputSource, Key};

impl Key {
    pub const fn virtual_key_code(self) -> i32 {
        match self {
            Key::Escape => 0x1B,
            Key::Numpad1 => 0x61,
            Key::Numpad3 => 0x63,
            Key::Numpad6 => 0x66,
            Key::F2 => 0x71,
            Key::F4 => 0x73,
            Key::F6 => 0x75,
        }
    }

    pub fn from_command(command: &str) -> Option<Key> {
        match command.trim().to_ascii_lowercase().as_str() {
            "esc" | "escape" | "q" | "quit" => Some(Key::Escape),
            "1" | "numpad1" => Some(Key::Numpad1),
            "3" | "numpad3" => Some(Key::Numpad3),
            "6" | "numpad6" => Some(Key::Numpad6),
            "f2" | "record" => Some(Key::F2),
            "f4" | "stop" => Some(Key::F4),
            "f6" | "center" => Some(Key::F6),
            _ => None,
        }
    }
}

#[cfg(windows)]
pub use self::win32::AsyncKeyboard;

#[cfg(windows)]
mod win32 {
    use std::collections::VecDeque;
    use std::time::{Duration, Instant};

    use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;

    use crate::input::{EdgeDetector, InputEvent, InputSource, Key};

    const POLL_INTERVAL: Duration = Duration::from_millis(5);

    pub struct AsyncKeyboard {
        edges: EdgeDetector<Key>,
        queue: VecDeque<InputEvent>,
    }

    impl AsyncKeyboard {
        pub fn new() -> Self {
            let mut keyboard = Self {
                edges: EdgeDetector::new(),
                queue: VecDeque::new(),
            };
            // keys already down at startup must not fire
            keyboard.edges.update(held_keys());
            keyboard
        }

        fn sample(&mut self) {
            let pressed = self.edges.update(held_keys());
            self.queue.extend(pressed.into_iter().map(InputEvent::from));
        }
    }

    fn held_keys() -> Vec<Key> {
        Key::ALL
            .into_iter()
            .filter(|key| {
                // Safety: GetAsyncKeyState has no preconditions.
                let state = unsafe { GetAsyncKeyState(key.virtual_key_code()) };
                (state as u16 & 0x8000) != 0
            })
            .collect()
    }

    impl InputSource for AsyncKeyboard {
        fn next_event(&mut self, timeout: Duration) -> Option<InputEvent> {
            let deadline = Instant::now() + timeout;
            loop {
                if let Some(event) = self.queue.pop_front() {
                    return Some(event);
                }
                self.sample();
                if !self.queue.is_empty() {
                    continue;
                }
                let now = Instant::now();
                if now >= deadline {
                    return None;
                }
                std::thread::sleep(POLL_INTERVAL.min(deadline - now));
            }
        }
    }
}

/// Reads one command per line on a background thread. End of input counts
/// as Escape.
pub struct StdinCommands {
    rx: mpsc::Receiver<InputEvent>,
}

impl StdinCommands {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match Key::from_command(&line) {
                    Some(key) => {
                        if tx.send(InputEvent::from(key)).is_err() {
                            return;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => debug!("Ignoring unknown command {:?}", line.trim()),
                }
            }
            let _ = tx.send(InputEvent::Exit);
        });

        Self { rx }
    }
}

impl InputSource for StdinCommands {
    fn next_event(&mut self, timeout: Duration) -> Option<InputEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => Some(InputEvent::Exit),
        }
    }
}

pub fn platform_input() -> Box<dyn InputSource> {
    #[cfg(windows)]
    {
        Box::new(AsyncKeyboard::new())
    }
    #[cfg(not(windows))]
    {
        Box::new(StdinCommands::spawn())
    }
}
