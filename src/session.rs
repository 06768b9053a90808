//! Per-thread settings and output routing.
//!
//! A `Session` carries everything that behaves per calling thread: the sleep
//! multiplier, verification, output level, trace selection, output
//! destinations and the detail of the most recent failure. Every display
//! operation takes one by reference. New sessions start from the calling
//! thread's defaults, which in turn fall back to process-wide defaults.

use std::cell::RefCell;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use std::{fmt, mem};
use crate::delay::{self, MAX_SLEEP_MULTIPLIER};
use crate::error::{Error, ErrorDetail};
use crate::stats;
use crate::trace::TraceSettings;

/// How much a session writes to its output stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputLevel {
    #[allow(missing_docs)]
    Terse = 0x04,
    #[allow(missing_docs)]
    Normal = 0x08,
    #[allow(missing_docs)]
    Verbose = 0x10,
    #[allow(missing_docs)]
    VeryVerbose = 0x20,
}

impl OutputLevel {
    #[allow(missing_docs)]
    pub fn name(self) -> &'static str {
        match self {
            OutputLevel::Terse => "Terse",
            OutputLevel::Normal => "Normal",
            OutputLevel::Verbose => "Verbose",
            OutputLevel::VeryVerbose => "Very Verbose",
        }
    }

    #[allow(missing_docs)]
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0x04 => Some(OutputLevel::Terse),
            0x08 => Some(OutputLevel::Normal),
            0x10 => Some(OutputLevel::Verbose),
            0x20 => Some(OutputLevel::VeryVerbose),
            _ => None,
        }
    }
}

impl Default for OutputLevel {
    fn default() -> Self {
        OutputLevel::Normal
    }
}

/// Options for `Session::start_capture`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Capture the error stream as well.
    pub stderr: bool,
}

// 1.0
static DEFAULT_SLEEP_MULTIPLIER: AtomicU64 = AtomicU64::new(0x3ff0_0000_0000_0000);
static REPORT_DDC_ERRORS: AtomicBool = AtomicBool::new(false);

#[derive(Clone, Debug)]
struct ThreadDefaults {
    sleep_multiplier: Option<f64>,
    verify: bool,
    output_level: OutputLevel,
}

impl Default for ThreadDefaults {
    fn default() -> Self {
        ThreadDefaults {
            sleep_multiplier: None,
            verify: true,
            output_level: Default::default(),
        }
    }
}

thread_local! {
    static THREAD_DEFAULTS: RefCell<ThreadDefaults> = RefCell::new(Default::default());
}

fn validate_multiplier(multiplier: f64) -> Result<f64, Error> {
    if multiplier.is_finite() && multiplier >= 0.0 && multiplier <= MAX_SLEEP_MULTIPLIER {
        Ok(multiplier)
    } else {
        Err(Error::InvalidArgument(format!("sleep multiplier {} not in 0..={}", multiplier, MAX_SLEEP_MULTIPLIER)))
    }
}

/// The process default sleep multiplier.
pub fn default_sleep_multiplier() -> f64 {
    f64::from_bits(DEFAULT_SLEEP_MULTIPLIER.load(Ordering::Relaxed))
}

/// Sets the process default sleep multiplier, returning the previous one.
pub fn set_default_sleep_multiplier(multiplier: f64) -> Result<f64, Error> {
    let multiplier = validate_multiplier(multiplier)?;
    Ok(f64::from_bits(DEFAULT_SLEEP_MULTIPLIER.swap(multiplier.to_bits(), Ordering::Relaxed)))
}

/// The sleep multiplier new sessions on this thread start with.
pub fn thread_sleep_multiplier() -> f64 {
    THREAD_DEFAULTS.with(|d| d.borrow().sleep_multiplier).unwrap_or_else(default_sleep_multiplier)
}

/// Overrides the sleep multiplier for new sessions on this thread, returning the previous one.
pub fn set_thread_sleep_multiplier(multiplier: f64) -> Result<f64, Error> {
    let multiplier = validate_multiplier(multiplier)?;
    let previous = thread_sleep_multiplier();
    THREAD_DEFAULTS.with(|d| d.borrow_mut().sleep_multiplier = Some(multiplier));
    Ok(previous)
}

/// Whether new sessions on this thread verify writes.
pub fn thread_verify() -> bool {
    THREAD_DEFAULTS.with(|d| d.borrow().verify)
}

/// Sets write verification for new sessions on this thread, returning the previous setting.
pub fn set_thread_verify(verify: bool) -> bool {
    THREAD_DEFAULTS.with(|d| mem::replace(&mut d.borrow_mut().verify, verify))
}

/// Output level new sessions on this thread start with.
pub fn thread_output_level() -> OutputLevel {
    THREAD_DEFAULTS.with(|d| d.borrow().output_level)
}

/// Sets the output level for new sessions on this thread, returning the previous one.
pub fn set_thread_output_level(level: OutputLevel) -> OutputLevel {
    THREAD_DEFAULTS.with(|d| mem::replace(&mut d.borrow_mut().output_level, level))
}

/// Whether each failed DDC exchange is reported on the session error stream.
pub fn is_report_ddc_errors_enabled() -> bool {
    REPORT_DDC_ERRORS.load(Ordering::Relaxed)
}

/// Toggles reporting of individual DDC exchange failures, returning the previous setting.
pub fn enable_report_ddc_errors(enable: bool) -> bool {
    REPORT_DDC_ERRORS.swap(enable, Ordering::Relaxed)
}

enum Sink {
    Default,
    Suppressed,
    Writer(Box<dyn Write + Send>),
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Sink::Default => "Default",
            Sink::Suppressed => "Suppressed",
            Sink::Writer(..) => "Writer",
        })
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Stream {
    Out,
    Err,
}

#[derive(Debug)]
struct Capture {
    buf: Vec<u8>,
    stderr: bool,
}

#[derive(Debug)]
struct Outputs {
    fout: Sink,
    ferr: Sink,
    capture: Option<Capture>,
}

impl Outputs {
    fn write(&mut self, stream: Stream, args: fmt::Arguments) {
        if let Some(capture) = self.capture.as_mut() {
            if stream == Stream::Out || capture.stderr {
                let _ = capture.buf.write_fmt(args);
                return
            }
        }

        let sink = match stream {
            Stream::Out => &mut self.fout,
            Stream::Err => &mut self.ferr,
        };
        let _ = match *sink {
            Sink::Default => match stream {
                Stream::Out => io::stdout().write_fmt(args),
                Stream::Err => io::stderr().write_fmt(args),
            },
            Sink::Suppressed => Ok(()),
            Sink::Writer(ref mut w) => w.write_fmt(args),
        };
    }
}

/// Settings and output state for a calling thread.
#[derive(Debug)]
pub struct Session {
    sleep_multiplier: f64,
    sleep_suppressed: bool,
    verify: bool,
    output_level: OutputLevel,
    trace: TraceSettings,
    error_detail: bool,
    report_error_info: bool,
    description: Option<String>,
    outputs: RefCell<Outputs>,
    last_error: RefCell<Option<ErrorDetail>>,
}

impl Session {
    /// Creates a session from this thread's defaults.
    pub fn new() -> Self {
        let defaults = THREAD_DEFAULTS.with(|d| d.borrow().clone());
        Session {
            sleep_multiplier: defaults.sleep_multiplier.unwrap_or_else(default_sleep_multiplier),
            sleep_suppressed: false,
            verify: defaults.verify,
            output_level: defaults.output_level,
            trace: Default::default(),
            error_detail: true,
            report_error_info: false,
            description: None,
            outputs: RefCell::new(Outputs {
                fout: Sink::Default,
                ferr: Sink::Default,
                capture: None,
            }),
            last_error: RefCell::new(None),
        }
    }

    /// The multiplier applied to every protocol sleep.
    pub fn sleep_multiplier(&self) -> f64 {
        self.sleep_multiplier
    }

    /// Sets the sleep multiplier, returning the previous one.
    pub fn set_sleep_multiplier(&mut self, multiplier: f64) -> Result<f64, Error> {
        let multiplier = validate_multiplier(multiplier)?;
        Ok(mem::replace(&mut self.sleep_multiplier, multiplier))
    }

    /// Skips the courtesy wait between successful commands.
    ///
    /// Response waits and retry backoff still apply.
    pub fn enable_sleep_suppression(&mut self, enable: bool) -> bool {
        mem::replace(&mut self.sleep_suppressed, enable)
    }

    #[allow(missing_docs)]
    pub fn is_sleep_suppressed(&self) -> bool {
        self.sleep_suppressed
    }

    /// Scales a nominal protocol delay.
    pub fn scale(&self, nominal: Duration) -> Duration {
        delay::scale(nominal, self.sleep_multiplier)
    }

    pub(crate) fn command_delay(&self, nominal: Duration) -> Duration {
        if self.sleep_suppressed {
            Duration::default()
        } else {
            self.scale(nominal)
        }
    }

    /// Sleeps for a scaled nominal delay.
    pub fn sleep(&self, nominal: Duration) {
        delay::sleep_for(self.scale(nominal))
    }

    /// Toggles read-back verification of writes, returning the previous setting.
    pub fn enable_verify(&mut self, enable: bool) -> bool {
        mem::replace(&mut self.verify, enable)
    }

    #[allow(missing_docs)]
    pub fn is_verify_enabled(&self) -> bool {
        self.verify
    }

    #[allow(missing_docs)]
    pub fn output_level(&self) -> OutputLevel {
        self.output_level
    }

    /// Sets the output level, returning the previous one.
    pub fn set_output_level(&mut self, level: OutputLevel) -> OutputLevel {
        mem::replace(&mut self.output_level, level)
    }

    /// Trace selection for this session.
    pub fn trace(&self) -> &TraceSettings {
        &self.trace
    }

    #[allow(missing_docs)]
    pub fn trace_mut(&mut self) -> &mut TraceSettings {
        &mut self.trace
    }

    /// Redirects the output stream. `None` discards output.
    pub fn set_fout(&self, writer: Option<Box<dyn Write + Send>>) {
        self.outputs.borrow_mut().fout = writer.map(Sink::Writer).unwrap_or(Sink::Suppressed);
    }

    /// Restores the output stream to stdout.
    pub fn set_fout_to_default(&self) {
        self.outputs.borrow_mut().fout = Sink::Default;
    }

    /// Redirects the error stream. `None` discards output.
    pub fn set_ferr(&self, writer: Option<Box<dyn Write + Send>>) {
        self.outputs.borrow_mut().ferr = writer.map(Sink::Writer).unwrap_or(Sink::Suppressed);
    }

    /// Restores the error stream to stderr.
    pub fn set_ferr_to_default(&self) {
        self.outputs.borrow_mut().ferr = Sink::Default;
    }

    /// Starts capturing output in memory. Does nothing if already capturing.
    pub fn start_capture(&self, options: CaptureOptions) {
        let mut outputs = self.outputs.borrow_mut();
        if outputs.capture.is_none() {
            outputs.capture = Some(Capture {
                buf: Vec::new(),
                stderr: options.stderr,
            });
        }
    }

    /// Stops capturing and returns what was captured.
    pub fn end_capture(&self) -> String {
        match self.outputs.borrow_mut().capture.take() {
            Some(capture) => String::from_utf8_lossy(&capture.buf).into_owned(),
            None => String::new(),
        }
    }

    /// Writes to the output stream if the output level permits.
    pub fn write_out(&self, level: OutputLevel, args: fmt::Arguments) {
        if self.output_level >= level {
            self.outputs.borrow_mut().write(Stream::Out, args)
        }
    }

    /// Writes to the error stream.
    pub fn write_err(&self, args: fmt::Arguments) {
        self.outputs.borrow_mut().write(Stream::Err, args)
    }

    /// Toggles retention of the most recent failure detail, returning the previous setting.
    pub fn enable_error_detail(&mut self, enable: bool) -> bool {
        if !enable {
            self.last_error.borrow_mut().take();
        }
        mem::replace(&mut self.error_detail, enable)
    }

    /// Detail of the most recent failed operation.
    pub fn error_detail(&self) -> Option<ErrorDetail> {
        self.last_error.borrow().clone()
    }

    /// Clears the retained failure detail.
    pub fn clear_error_detail(&self) {
        self.last_error.borrow_mut().take();
    }

    /// Writes the detail of every failed operation to the error stream, returning the previous setting.
    pub fn enable_report_error_info(&mut self, enable: bool) -> bool {
        mem::replace(&mut self.report_error_info, enable)
    }

    #[allow(missing_docs)]
    pub fn description(&self) -> Option<&str> {
        self.description.as_ref().map(|s| &s[..])
    }

    /// Names this session in traces.
    pub fn set_description<S: Into<String>>(&mut self, description: S) {
        self.description = Some(description.into())
    }

    #[allow(missing_docs)]
    pub fn append_description(&mut self, text: &str) {
        match self.description {
            Some(ref mut d) => {
                d.push_str("; ");
                d.push_str(text);
            },
            None => self.description = Some(text.to_owned()),
        }
    }

    pub(crate) fn record<T>(&self, result: Result<T, Error>) -> Result<T, Error> {
        if let Err(ref e) = result {
            stats::record_error(e.status());
            if !self.report_error_info && !self.error_detail {
                return result
            }

            let detail = e.detail();
            if self.report_error_info {
                self.write_err(format_args!("{}", detail));
            }
            if self.error_detail {
                *self.last_error.borrow_mut() = Some(detail);
            }
        }
        result
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use crate::status::Status;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn multiplier_validation() {
        let mut session = Session::new();
        assert!(session.set_sleep_multiplier(-1.0).is_err());
        assert!(session.set_sleep_multiplier(::std::f64::INFINITY).is_err());
        assert!(session.set_sleep_multiplier(0.5).is_ok());
        assert_eq!(session.set_sleep_multiplier(0.0).unwrap(), 0.5);
        assert_eq!(session.scale(Duration::from_millis(40)), Duration::default());
    }

    #[test]
    fn thread_defaults_are_per_thread() {
        set_thread_verify(false);
        set_thread_sleep_multiplier(2.0).unwrap();
        assert!(!Session::new().is_verify_enabled());
        assert_eq!(Session::new().sleep_multiplier(), 2.0);

        ::std::thread::spawn(|| {
            assert!(Session::new().is_verify_enabled());
            assert_eq!(Session::new().sleep_multiplier(), default_sleep_multiplier());
        }).join().unwrap();
    }

    #[test]
    fn capture() {
        let session = Session::new();
        session.start_capture(CaptureOptions::default());
        session.write_out(OutputLevel::Normal, format_args!("hello {}", 1));
        session.write_out(OutputLevel::Verbose, format_args!("hidden"));
        session.start_capture(CaptureOptions { stderr: true });
        session.set_ferr(None);
        session.write_err(format_args!("dropped"));
        assert_eq!(session.end_capture(), "hello 1");
        assert_eq!(session.end_capture(), "");
    }

    #[test]
    fn redirect() {
        let session = Session::new();
        let out = Shared::default();
        session.set_fout(Some(Box::new(out.clone())));
        session.write_out(OutputLevel::Terse, format_args!("x"));
        session.set_fout(None);
        session.write_out(OutputLevel::Terse, format_args!("y"));
        assert_eq!(&out.0.lock().unwrap()[..], b"x");
    }

    #[test]
    fn error_detail() {
        let mut session = Session::new();
        let err = Shared::default();
        session.set_ferr(Some(Box::new(err.clone())));
        session.enable_report_error_info(true);

        let r: Result<(), _> = session.record(Err(Error::Locked));
        assert!(r.is_err());
        assert_eq!(session.error_detail().unwrap().status, Status::LOCKED);
        assert!(!err.0.lock().unwrap().is_empty());

        session.enable_error_detail(false);
        assert_eq!(session.error_detail(), None);
        let _ = session.record::<()>(Err(Error::NotFound));
        assert_eq!(session.error_detail(), None);
    }

    #[test]
    fn failures_counted_without_detail() {
        let mut session = Session::new();
        session.enable_error_detail(false);
        session.enable_report_error_info(false);

        let status = Error::DisplayNotFound.status();
        let before = stats::snapshot().error_count(status);
        let _ = session.record::<()>(Err(Error::DisplayNotFound));
        assert_eq!(session.error_detail(), None);
        assert!(stats::snapshot().error_count(status) > before);
    }
}
