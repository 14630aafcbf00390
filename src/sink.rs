//! Observers notified by the aligner.
//!
//! A sink owns a reporter behind a mutex so that one sink can be shared by
//! every worker thread while each line is written atomically.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::aligner::AlignOutcome;
use crate::metrics::SwCounters;
use crate::Result;

/// Writes one record of counters.
pub trait CounterReporter: Send {
    fn report_counters_impl(&mut self, counters: &SwCounters) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Receives the counters of every DP invocation.
pub struct SwCounterSink {
    reporter: Mutex<Box<dyn CounterReporter>>,
}

impl SwCounterSink {
    pub fn new(reporter: impl CounterReporter + 'static) -> Self {
        Self {
            reporter: Mutex::new(Box::new(reporter)),
        }
    }

    pub fn report_counters(&self, counters: &SwCounters) -> Result<()> {
        let mut reporter = self.reporter.lock().unwrap_or_else(PoisonError::into_inner);
        reporter.report_counters_impl(counters)?;
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        let mut reporter = self.reporter.lock().unwrap_or_else(PoisonError::into_inner);
        reporter.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for SwCounterSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwCounterSink").finish_non_exhaustive()
    }
}

/// Tab-delimited counters, one invocation per line:
/// sws, swcups, swrows, swskiprows, swskip, swsucc, swfail, swbts.
pub struct StreamTabCounterReporter<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> StreamTabCounterReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> CounterReporter for StreamTabCounterReporter<W> {
    fn report_counters_impl(&mut self, c: &SwCounters) -> io::Result<()> {
        writeln!(
            self.out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            c.sws, c.swcups, c.swrows, c.swskiprows, c.swskip, c.swsucc, c.swfail, c.swbts
        )
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// What the aligner did with one read / window pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwAction {
    pub read_name: String,
    pub outcome: AlignOutcome,
    pub read_len: usize,
    pub ref_offset: usize,
    pub ref_len: usize,
    pub score: Option<i32>,
}

pub trait ActionReporter: Send {
    fn report_action_impl(&mut self, action: &SwAction) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Receives one action per DP invocation.
pub struct SwActionSink {
    reporter: Mutex<Box<dyn ActionReporter>>,
}

impl SwActionSink {
    pub fn new(reporter: impl ActionReporter + 'static) -> Self {
        Self {
            reporter: Mutex::new(Box::new(reporter)),
        }
    }

    pub fn report_action(&self, action: &SwAction) -> Result<()> {
        let mut reporter = self.reporter.lock().unwrap_or_else(PoisonError::into_inner);
        reporter.report_action_impl(action)?;
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        let mut reporter = self.reporter.lock().unwrap_or_else(PoisonError::into_inner);
        reporter.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for SwActionSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwActionSink").finish_non_exhaustive()
    }
}

/// Tab-delimited actions: name, outcome, read length, window offset,
/// window length, score (`*` when there is none).
pub struct StreamTabActionReporter<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> StreamTabActionReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ActionReporter for StreamTabActionReporter<W> {
    fn report_action_impl(&mut self, a: &SwAction) -> io::Result<()> {
        write!(
            self.out,
            "{}\t{}\t{}\t{}\t{}\t",
            a.read_name, a.outcome, a.read_len, a.ref_offset, a.ref_len
        )?;
        match a.score {
            Some(s) => writeln!(self.out, "{}", s),
            None => writeln!(self.out, "*"),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
