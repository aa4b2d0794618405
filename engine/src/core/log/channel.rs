use crossbeam::channel::{Receiver, Sender, unbounded};
use ::log::{Level, LevelFilter, Metadata, Record};

/// One forwarded log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// A [`log::Log`](::log::Log) implementation sending every enabled record over a crossbeam
/// channel.
pub struct ChannelLogger {
    sender: Sender<LogMessage>,
    level: LevelFilter,
}

impl ::log::Log for ChannelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // A dropped receiver only means nobody is listening any more.
            let _ = self.sender.try_send(LogMessage {
                level: record.metadata().level(),
                target: record.target().to_string(),
                message: format!("{}", record.args()),
            });
        }
    }

    fn flush(&self) {}
}

impl ChannelLogger {
    /// Forward records up to `Info`.
    pub fn new(sender: Sender<LogMessage>) -> Self {
        Self::with_level(sender, LevelFilter::Info)
    }

    /// Forward records up to `level`.
    pub fn with_level(sender: Sender<LogMessage>, level: LevelFilter) -> Self {
        Self { sender, level }
    }

    pub fn with_receiver(level: LevelFilter) -> (Self, Receiver<LogMessage>) {
        let (sender, receiver) = unbounded();
        (Self::with_level(sender, level), receiver)
    }

    /// The most verbose level forwarded.
    #[inline]
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Install as the global logger. Fails if a logger is already installed.
    pub fn install(self) -> Result<(), ::log::SetLoggerError> {
        let level = self.level;
        ::log::set_boxed_logger(Box::new(self))?;
        ::log::set_max_level(level);
        Ok(())
    }
}
