// Copyright (c) 2019-present Dmitry Stepanov and Fyrox Engine contributors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Simple logger. By default, it writes in the console only. To enable logging into a file, call
//! [`Log::set_file`] before building any programs.
//!
//! Diagnostics are written with the [`info!`](crate::info), [`warn!`](crate::warn) and
//! [`err!`](crate::err) macros. Tools and tests observe them by registering a listener with
//! [`Log::add_listener`].

use crate::instant::Instant;
use crate::parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::sync::mpsc::Sender;
use std::sync::LazyLock;
use std::time::Duration;

/// A message that could be sent by the logger to all listeners.
#[derive(Debug, Clone)]
pub struct LogMessage {
    /// Kind of the message: information, warning or error.
    pub kind: MessageKind,
    /// The source message without logger prefixes.
    pub content: String,
    /// Time point at which the message was recorded. It is relative to the moment when the
    /// logger was initialized.
    pub time: Duration,
}

static LOG: LazyLock<Mutex<Log>> = LazyLock::new(|| {
    Mutex::new(Log {
        file: None,
        verbosity: MessageKind::Information,
        listeners: Default::default(),
        time_origin: Instant::now(),
        console: true,
    })
});

/// A kind of message.
#[derive(
    Debug, Default, Copy, Clone, PartialOrd, PartialEq, Eq, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u32)]
pub enum MessageKind {
    /// Some useful information.
    #[default]
    Information = 0,
    /// A warning.
    Warning = 1,
    /// An error of some kind.
    Error = 2,
}

impl MessageKind {
    fn as_str(self) -> &'static str {
        match self {
            MessageKind::Information => "[INFO]: ",
            MessageKind::Warning => "[WARNING]: ",
            MessageKind::Error => "[ERROR]: ",
        }
    }
}

/// See module docs.
pub struct Log {
    file: Option<std::fs::File>,
    verbosity: MessageKind,
    listeners: Vec<Sender<LogMessage>>,
    time_origin: Instant,
    console: bool,
}

impl Log {
    /// Sets new file to write the log to.
    pub fn set_file(file: Option<std::fs::File>) {
        LOG.lock().file = file;
    }

    /// Enables or disables console output. Listeners and the log file are not affected.
    pub fn set_console_output(enabled: bool) {
        LOG.lock().console = enabled;
    }

    fn write_internal<S>(&mut self, kind: MessageKind, message: S)
    where
        S: AsRef<str>,
    {
        if kind < self.verbosity {
            return;
        }

        let mut msg = message.as_ref().to_owned();

        // Notify listeners about the message and remove all disconnected listeners.
        let time = Instant::now() - self.time_origin;
        self.listeners.retain(|listener| {
            listener
                .send(LogMessage {
                    kind,
                    content: msg.clone(),
                    time,
                })
                .is_ok()
        });

        msg.insert_str(0, kind.as_str());

        if self.console {
            let _ = io::stdout().write_all(msg.as_bytes());
        }

        if let Some(log_file) = self.file.as_mut() {
            let _ = log_file.write_all(msg.as_bytes());
            let _ = log_file.flush();
        }
    }

    /// Writes a string to the console and optionally into the file (if set), adds a new line to the
    /// end of the message.
    pub fn writeln<S>(kind: MessageKind, msg: S)
    where
        S: AsRef<str>,
    {
        let mut msg = msg.as_ref().to_owned();
        msg.push('\n');
        LOG.lock().write_internal(kind, msg);
    }

    /// Writes an information message.
    pub fn info<S>(msg: S)
    where
        S: AsRef<str>,
    {
        Self::writeln(MessageKind::Information, msg)
    }

    /// Writes a warning message.
    pub fn warn<S>(msg: S)
    where
        S: AsRef<str>,
    {
        Self::writeln(MessageKind::Warning, msg)
    }

    /// Writes error message.
    pub fn err<S>(msg: S)
    where
        S: AsRef<str>,
    {
        Self::writeln(MessageKind::Error, msg)
    }

    /// Sets verbosity level.
    pub fn set_verbosity(kind: MessageKind) {
        LOG.lock().verbosity = kind;
    }

    /// Adds a listener that will receive a copy of every message passed into the log.
    pub fn add_listener(listener: Sender<LogMessage>) {
        LOG.lock().listeners.push(listener)
    }
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log::Log::info(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log::Log::warn(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::log::Log::err(format!($($arg)*))
    };
}
