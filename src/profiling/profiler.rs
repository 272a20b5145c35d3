//! Chrome Trace span profiling for warehouse operations.
//!
//! Feature-gated with `--features profiling`.
//!
//! Usage:
//!   object_warehouse::profiler::init("profile/trace.json");
//!   {
//!     let _g = object_warehouse::profiler::span("Warehouse::resolve");
//!     // run queries...
//!   }
//!   object_warehouse::profiler::shutdown()?;

use std::borrow::Cow;
use std::path::Path;


#[cfg(feature = "profiling")]
mod enabled {
    use std::fs::File;
    use std::io::{BufWriter, Write};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::OnceLock;
    use std::time::Instant;

    use parking_lot::Mutex;
    use serde_json::{json, Value};

    use super::*;


    struct ProfilerState {
        start: Instant,
        out_path: PathBuf,
        is_on: AtomicBool,
        events: Mutex<Vec<Value>>,
    }

    static STATE: OnceLock<ProfilerState> = OnceLock::new();
    static NEXT_TID: AtomicU64 = AtomicU64::new(1);

    thread_local! {
        static TID: u64 = NEXT_TID.fetch_add(1, Ordering::Relaxed);
    }

    fn now_us(state: &ProfilerState) -> u64 {
        state.start.elapsed().as_micros() as u64
    }

    fn push_event(event: Value) {
        let Some(state) = STATE.get() else { return; };
        if !state.is_on.load(Ordering::Acquire) {
            return;
        }
        state.events.lock().push(event);
    }

    /// Initialize the profiler and set the output path. Later calls are ignored.
    pub fn init<P: AsRef<Path>>(path: P) {
        let _ = STATE.set(ProfilerState {
            start: Instant::now(),
            out_path: path.as_ref().to_path_buf(),
            is_on: AtomicBool::new(true),
            events: Mutex::new(Vec::new()),
        });
    }

    /// Stop recording and write the Chrome Trace JSON.
    pub fn shutdown() -> std::io::Result<()> {
        let Some(state) = STATE.get() else { return Ok(()); };
        state.is_on.store(false, Ordering::Release);

        let events = std::mem::take(&mut *state.events.lock());
        if let Some(parent) = state.out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut w = BufWriter::new(File::create(&state.out_path)?);
        serde_json::to_writer(&mut w, &json!({ "traceEvents": events }))?;
        w.flush()
    }

    /// Label the current thread in the trace viewer.
    pub fn thread_name(name: impl Into<String>) {
        let Some(state) = STATE.get() else { return; };
        push_event(json!({
            "name": "thread_name",
            "ph": "M",
            "ts": now_us(state),
            "pid": 1,
            "tid": TID.with(|t| *t),
            "args": { "name": name.into() },
        }));
    }

    /// Opens a span closed when the guard drops.
    pub fn span(name: impl Into<SpanName>) -> SpanGuard {
        match STATE.get() {
            Some(state) if state.is_on.load(Ordering::Acquire) => SpanGuard {
                name: Some(name.into().0),
                ts0: now_us(state),
                args: serde_json::Map::new(),
            },
            _ => SpanGuard { name: None, ts0: 0, args: serde_json::Map::new() },
        }
    }

    /// RAII guard recording a complete (`ph:"X"`) event on drop.
    pub struct SpanGuard {
        name: Option<Cow<'static, str>>,
        ts0: u64,
        args: serde_json::Map<String, Value>,
    }

    impl SpanGuard {
        /// Attaches a numeric argument to this span.
        #[inline]
        pub fn arg(mut self, key: &str, value: u64) -> Self {
            if self.name.is_some() {
                self.args.insert(key.to_string(), Value::from(value));
            }
            self
        }
    }

    impl Drop for SpanGuard {
        fn drop(&mut self) {
            let (Some(name), Some(state)) = (self.name.take(), STATE.get()) else { return; };
            let dur = now_us(state).saturating_sub(self.ts0);
            push_event(json!({
                "name": name,
                "cat": "warehouse",
                "ph": "X",
                "ts": self.ts0,
                "dur": dur,
                "pid": 1,
                "tid": TID.with(|t| *t),
                "args": std::mem::take(&mut self.args),
            }));
        }
    }
}

#[cfg(not(feature = "profiling"))]
mod disabled {
    use super::*;

    /// Initialize profiler (no-op when profiling is disabled).
    #[inline]
    pub fn init<P: AsRef<Path>>(_path: P) {}

    /// Shut down profiler (no-op).
    #[inline]
    pub fn shutdown() -> std::io::Result<()> { Ok(()) }

    /// Set thread name (no-op).
    #[inline]
    pub fn thread_name(_name: impl Into<String>) {}

    /// Create profiling span (no-op).
    #[inline]
    pub fn span(_name: impl Into<SpanName>) -> SpanGuard { SpanGuard }

    /// No-op span guard.
    pub struct SpanGuard;

    impl SpanGuard {
        /// Attach an argument to this span (no-op).
        #[inline]
        pub fn arg(self, _key: &str, _value: u64) -> Self { self }
    }
}

/// A span name; accepts `&'static str`, `String`, or `Cow<'static, str>`.
pub struct SpanName(pub Cow<'static, str>);

impl From<&'static str> for SpanName {
    fn from(s: &'static str) -> Self { SpanName(Cow::Borrowed(s)) }
}

impl From<String> for SpanName {
    fn from(s: String) -> Self { SpanName(Cow::Owned(s)) }
}

impl From<Cow<'static, str>> for SpanName {
    fn from(s: Cow<'static, str>) -> Self { SpanName(s) }
}

#[cfg(feature = "profiling")]
pub use enabled::{init, shutdown, span, thread_name, SpanGuard};

#[cfg(not(feature = "profiling"))]
pub use disabled::{init, shutdown, span, thread_name, SpanGuard};
