//! Batch progress bar and a log writer that prints above it.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static BARS: OnceLock<MultiProgress> = OnceLock::new();

fn bars() -> &'static MultiProgress {
    BARS.get_or_init(|| {
        let bars = MultiProgress::new();
        bars.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        bars
    })
}

/// Progress bar counting fetched batches; hidden when `quiet`
pub fn batch_progress(batches: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = bars().add(ProgressBar::new(batches));
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} fetching batches [{bar:30}] {pos}/{len} {msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

/// `MakeWriter` for tracing-subscriber that routes lines through the bars
#[derive(Default, Clone)]
pub struct LogWriterFactory;

/// Buffers partial writes and emits whole lines
pub struct LogWriter {
    pending: String,
}

fn emit(line: &str) {
    let line = line.trim_end_matches('\r');
    // a hidden target (stderr not a terminal) swallows println
    if bars().is_hidden() {
        let _ = writeln!(io::stderr(), "{}", line);
    } else {
        let _ = bars().println(line);
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.push_str(&String::from_utf8_lossy(buf));
        while let Some(end) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=end).collect();
            emit(line.trim_end_matches('\n'));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            emit(&rest);
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            pending: String::new(),
        }
    }
}
