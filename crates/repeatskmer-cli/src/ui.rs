use indicatif::{MultiProgress, ProgressDrawTarget};
use std::io::{self, Write};
use tracing_subscriber::fmt::MakeWriter;

/// Shared terminal output. Progress bars live in its [`MultiProgress`]; log
/// lines written through it are printed with the bars suspended so the two
/// never interleave.
#[derive(Clone)]
pub struct Console {
    mp: MultiProgress,
}

impl Console {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr_with_hz(12))
    }

    pub fn hidden() -> Self {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let mp = MultiProgress::new();
        mp.set_draw_target(target);
        Self { mp }
    }

    pub fn multi(&self) -> &MultiProgress {
        &self.mp
    }

    /// Prints a user-facing line above any active bars.
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.mp.is_hidden() {
            eprintln!("{}", msg.as_ref());
        } else {
            self.mp.println(msg).ok();
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

/// One formatted log event, flushed to stderr when dropped.
pub struct ConsoleLine {
    console: Console,
    buf: Vec<u8>,
}

impl Write for ConsoleLine {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let buf = std::mem::take(&mut self.buf);
        self.console.mp.suspend(|| {
            let mut stderr = io::stderr().lock();
            stderr.write_all(&buf).ok();
            stderr.flush().ok();
        });
    }
}

impl<'a> MakeWriter<'a> for Console {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine {
            console: self.clone(),
            buf: Vec::new(),
        }
    }
}
