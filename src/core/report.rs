use crate::domain::model::{JobOutcome, JobResult};
use crate::domain::ports::Reporter;
use crate::utils::error::{DispatchError, Result};
use std::fmt::Write as _;
use std::io::Write;
use std::sync::Mutex;

pub const SEPARATOR: &str = "--";

/// Render the console block for one finished job: separator, product line,
/// stdout text, stderr text. Output is decoded lossily.
pub fn render_block(outcome: &JobOutcome) -> String {
    let mut block = String::new();
    block.push_str(SEPARATOR);
    block.push('\n');
    let _ = writeln!(block, "Product: {}", outcome.job.product);

    match &outcome.result {
        JobResult::Completed(output) => {
            block.push_str(&String::from_utf8_lossy(&output.stdout));
            block.push('\n');
            block.push_str(&String::from_utf8_lossy(&output.stderr));
            block.push('\n');
        }
        JobResult::LaunchFailed(message) => {
            block.push('\n');
            block.push_str(message);
            block.push('\n');
        }
    }

    block
}

/// Writes each block in one locked write so concurrent jobs never split it.
#[derive(Debug)]
pub struct StreamReporter<W> {
    sink: Mutex<W>,
}

pub type ConsoleReporter = StreamReporter<std::io::Stdout>;

impl<W: Write + Send + 'static> StreamReporter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }
}

impl ConsoleReporter {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl StreamReporter<Vec<u8>> {
    pub fn buffered() -> Self {
        Self::new(Vec::new())
    }

    /// Everything written so far.
    pub fn text(&self) -> String {
        match self.sink.lock() {
            Ok(buffer) => String::from_utf8_lossy(&buffer).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }
}

impl<W: Write + Send + 'static> Reporter for StreamReporter<W> {
    fn report(&self, outcome: &JobOutcome) -> Result<()> {
        let block = render_block(outcome);
        let mut sink = self.sink.lock().map_err(|_| {
            DispatchError::IoError(std::io::Error::other("report sink lock poisoned"))
        })?;
        sink.write_all(block.as_bytes())?;
        sink.flush()?;
        Ok(())
    }
}
