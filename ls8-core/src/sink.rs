use std::fmt;
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Output {
    Number(u8),
    Char(char),
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Number(value) => writeln!(f, "{}", value),
            Output::Char(c) => write!(f, "{}", c),
        }
    }
}

/// Receives values printed by the running program.
pub trait OutputSink {
    fn emit(&mut self, value: Output);
}

impl<T: OutputSink + ?Sized> OutputSink for &mut T {
    fn emit(&mut self, value: Output) {
        (**self).emit(value)
    }
}

/// Writes every value to stdout as soon as it is emitted.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, value: Output) {
        let mut stdout = io::stdout().lock();
        if let Err(err) = write!(stdout, "{}", value).and_then(|_| stdout.flush()) {
            tracing::warn!("failed to write {:?} to stdout: {}", value, err);
        }
    }
}

/// Records emitted values in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BufferSink {
    values: Vec<Output>,
}

impl BufferSink {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn values(&self) -> &[Output] {
        &self.values
    }

    /// Renders the values the way `StdoutSink` would have printed them.
    pub fn text(&self) -> String {
        self.values.iter().map(ToString::to_string).collect()
    }
}

impl OutputSink for BufferSink {
    fn emit(&mut self, value: Output) {
        self.values.push(value);
    }
}
