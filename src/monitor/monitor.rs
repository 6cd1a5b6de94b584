use std::{collections::HashMap, path::Path, sync::Arc};

use log::{debug, trace, warn};
use parking_lot::Mutex;

use crate::{
    config::MonitorConfig,
    errors::errors::{Error, MonitorError},
    extractor::extractor::parse_module,
    scope::table::LineTypeTable,
    type_checker::{resolver::Environment, type_checker::check_annotation},
};

use super::{
    dispatch::{self, Subscriber, SubscriptionId},
    events::{EventKind, Frame},
    result::CheckResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Tracing(SubscriptionId),
}

/// Checks every annotated local of every observed frame against its
/// declared type while tracing.
///
/// ```ignore
/// let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix("/project"));
/// monitor.run(|| program.execute())?;
/// for result in monitor.results() { ... }
/// ```
pub struct TypeMonitor {
    config: MonitorConfig,
    state: Mutex<State>,
    results: Mutex<Vec<CheckResult>>,
    /// `None` marks a file that failed to parse.
    cache: Mutex<HashMap<String, Option<Arc<LineTypeTable>>>>,
    parse_errors: Mutex<Vec<Error>>,
}

impl TypeMonitor {
    pub fn new(config: MonitorConfig) -> Arc<Self> {
        Arc::new(TypeMonitor {
            config,
            state: Mutex::new(State::Idle),
            results: Mutex::new(Vec::new()),
            cache: Mutex::new(HashMap::new()),
            parse_errors: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Starts a session: clears previous results and subscribes to events
    /// from every thread.
    pub fn start(self: &Arc<Self>) -> Result<(), MonitorError> {
        self.begin().map(|_| ())
    }

    fn begin(self: &Arc<Self>) -> Result<SubscriptionId, MonitorError> {
        let mut state = self.state.lock();
        if *state != State::Idle {
            return Err(MonitorError::AlreadyTracing);
        }

        self.results.lock().clear();
        self.parse_errors.lock().clear();
        let id = dispatch::subscribe(Arc::clone(self) as Arc<dyn Subscriber>);
        *state = State::Tracing(id);

        debug!("tracing started (path prefix {:?})", self.config.path_prefix);
        Ok(id)
    }

    /// Ends the session. No event is observed after this returns.
    pub fn stop(&self) -> Result<(), MonitorError> {
        self.end(None)
    }

    /// Ends the current session, or only the one subscribed as `owner`.
    fn end(&self, owner: Option<SubscriptionId>) -> Result<(), MonitorError> {
        let mut state = self.state.lock();
        let State::Tracing(id) = *state else {
            return Err(MonitorError::NotTracing);
        };
        if owner.is_some_and(|owner| owner != id) {
            return Err(MonitorError::NotTracing);
        }

        *state = State::Idle;
        drop(state);
        dispatch::unsubscribe(id);
        self.cache.lock().clear();

        debug!("tracing stopped, {} result(s)", self.results.lock().len());
        Ok(())
    }

    /// Starts tracing until the returned guard is dropped.
    pub fn session(self: &Arc<Self>) -> Result<Session, MonitorError> {
        let id = self.begin()?;
        Ok(Session {
            monitor: Arc::clone(self),
            id,
        })
    }

    /// Runs `program` with tracing enabled. Tracing is stopped afterwards,
    /// also when `program` panics.
    pub fn run<T>(self: &Arc<Self>, program: impl FnOnce() -> T) -> Result<T, MonitorError> {
        let _session = self.session()?;
        Ok(program())
    }

    pub fn is_tracing(&self) -> bool {
        *self.state.lock() != State::Idle
    }

    /// Snapshot of the results in observation order.
    pub fn results(&self) -> Vec<CheckResult> {
        self.results.lock().clone()
    }

    /// Files that could not be parsed during the session.
    pub fn parse_errors(&self) -> Vec<Error> {
        self.parse_errors.lock().clone()
    }

    /// Checks the annotated locals of one frame and records the results.
    pub fn check_frame(&self, frame: &Frame) {
        if !self.config.observes(&frame.file) || !Path::new(&frame.file).exists() {
            return;
        }
        let Some(table) = self.line_types(&frame.file) else {
            return;
        };
        let Some(types) = table.types_at(frame.line) else {
            return;
        };

        let env = Environment::new(&frame.locals, &frame.globals);
        let mut observed = Vec::new();

        for (varname, value) in frame.locals.iter() {
            let Some(Some(type_expression)) = types.get(varname) else {
                continue;
            };

            match check_annotation(value, type_expression, &env) {
                Ok(verdict) => observed.push(CheckResult {
                    file_path: frame.file.clone(),
                    line: frame.line,
                    varname: varname.to_string(),
                    value: value.clone(),
                    type_expression: type_expression.clone(),
                    descriptor: verdict.descriptor,
                    outcome: verdict.outcome,
                }),
                Err(error) => trace!("{}:{}: skipping {}: {}", frame.file, frame.line, varname, error),
            }
        }

        if !observed.is_empty() {
            self.results.lock().extend(observed);
        }
    }

    /// The file's table, parsing it on first use.
    fn line_types(&self, file: &str) -> Option<Arc<LineTypeTable>> {
        let mut cache = self.cache.lock();
        if let Some(entry) = cache.get(file) {
            return entry.clone();
        }

        let entry = match parse_module(file) {
            Ok(table) => {
                debug!("cached {} ({} lines)", file, table.line_end());
                Some(Arc::new(table))
            }
            Err(error) => {
                warn!("cannot check {}: {}", file, error);
                self.parse_errors.lock().push(error);
                None
            }
        };
        cache.insert(file.to_string(), entry.clone());
        entry
    }
}

impl Subscriber for TypeMonitor {
    fn on_event(&self, kind: EventKind, frame: &Frame) {
        trace!("{} {}:{}", kind, frame.file, frame.line);
        self.check_frame(frame);
    }
}

/// Keeps a monitor tracing; stops it when dropped, including on unwind.
pub struct Session {
    monitor: Arc<TypeMonitor>,
    id: SubscriptionId,
}

impl Session {
    pub fn monitor(&self) -> &Arc<TypeMonitor> {
        &self.monitor
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Stopped explicitly, possibly restarted by someone else since
        let _ = self.monitor.end(Some(self.id));
    }
}
