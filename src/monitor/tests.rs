use std::{
    fs,
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
};

use super::{
    dispatch::{self, Subscriber},
    events::{EventKind, Frame},
    monitor::TypeMonitor,
};
use crate::{
    config::MonitorConfig,
    errors::errors::MonitorError,
    runtime::{literal::literal_eval, namespace::Namespace, types::BuiltinType, value::Value},
    type_checker::type_checker::Outcome,
};

const SOURCE: &str = "\
def total(values: list[int], scale):
    result: int = 0
    for value in values:
        result += value
    return result * scale
";

struct Fixture {
    _dir: tempfile::TempDir,
    prefix: String,
    file: String,
}

fn fixture(source: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("program.py");
    fs::write(&path, source).unwrap();

    Fixture {
        prefix: dir.path().to_string_lossy().to_string(),
        file: path.to_string_lossy().to_string(),
        _dir: dir,
    }
}

fn locals(bindings: &[(&str, &str)]) -> Namespace {
    bindings
        .iter()
        .map(|(name, value)| (name.to_string(), literal_eval(value).unwrap()))
        .collect()
}

fn frame(fixture: &Fixture, line: u32, bindings: &[(&str, &str)]) -> Frame {
    Frame::new(&fixture.file, line, locals(bindings), &Arc::new(Namespace::new()))
}

#[test]
fn test_checks_annotated_locals() {
    let fixture = fixture(SOURCE);
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix(&fixture.prefix));

    monitor.check_frame(&frame(&fixture, 1, &[("values", "[1, 2]"), ("scale", "2")]));
    monitor.check_frame(&frame(&fixture, 3, &[("values", "[1, 'x']"), ("scale", "2"), ("result", "0")]));

    let results = monitor.results();
    assert_eq!(results.len(), 3);

    assert_eq!(results[0].varname, "values");
    assert_eq!(results[0].line, 1);
    assert_eq!(results[0].outcome, Outcome::Conformant);
    assert_eq!(results[0].descriptor.as_ref().unwrap().to_string(), "list[int]");

    assert_eq!(results[1].varname, "values");
    assert_eq!(results[1].outcome, Outcome::Mismatch);
    assert_eq!(results[1].value.to_string(), "[1, 'x']");

    assert_eq!(results[2].varname, "result");
    assert_eq!(results[2].type_expression, "int");
    assert!(results[2].is_conformant());
}

#[test]
fn test_skips_frames_outside_prefix() {
    let fixture = fixture(SOURCE);
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix("/somewhere/else"));

    monitor.check_frame(&frame(&fixture, 1, &[("values", "[1]")]));
    assert!(monitor.results().is_empty());
}

#[test]
fn test_skips_missing_files() {
    let fixture = fixture(SOURCE);
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix(&fixture.prefix));
    let missing = Frame::new(
        &format!("{}/gone.py", fixture.prefix),
        1,
        locals(&[("values", "[1]")]),
        &Arc::new(Namespace::new()),
    );

    monitor.check_frame(&missing);
    assert!(monitor.results().is_empty());
    assert!(monitor.parse_errors().is_empty());
}

#[test]
fn test_unannotated_and_unresolved_are_skipped() {
    let fixture = fixture("def f(a, b: Missing, c: int):\n    return a\n");
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix(&fixture.prefix));

    monitor.check_frame(&frame(&fixture, 1, &[("a", "1"), ("b", "2"), ("c", "3")]));

    let results = monitor.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].varname, "c");
}

#[test]
fn test_malformed_and_unsupported_are_recorded() {
    let fixture = fixture("def f(a: dict[int], b: tuple[int]):\n    return a\n");
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix(&fixture.prefix));

    monitor.check_frame(&frame(&fixture, 2, &[("a", "{1: 2}"), ("b", "(1,)")]));

    let results = monitor.results();
    assert_eq!(results.len(), 2);
    assert!(matches!(results[0].outcome, Outcome::Malformed(_)));
    assert!(matches!(results[1].outcome, Outcome::Unsupported(_)));
    assert!(results[1].descriptor.is_none());
}

#[test]
fn test_annotation_resolved_in_frame_environment() {
    let fixture = fixture("def f(a: Number):\n    return a\n");
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix(&fixture.prefix));
    let globals = Arc::new(Namespace::new().with("Number", Value::builtin_type(BuiltinType::Float)));

    let frame = Frame::new(&fixture.file, 2, locals(&[("a", "1.5")]), &globals);
    monitor.check_frame(&frame);

    assert_eq!(monitor.results().len(), 1);
    assert!(monitor.results()[0].is_conformant());
}

#[test]
fn test_parse_failure_is_cached_and_reported() {
    let fixture = fixture("def broken(:\n    pass\n");
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix(&fixture.prefix));

    monitor.check_frame(&frame(&fixture, 1, &[("a", "1")]));
    monitor.check_frame(&frame(&fixture, 2, &[("a", "1")]));

    assert!(monitor.results().is_empty());
    assert_eq!(monitor.parse_errors().len(), 1);
}

#[test]
fn test_start_stop_state_machine() {
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix("/nowhere"));

    assert!(!monitor.is_tracing());
    assert_eq!(monitor.stop(), Err(MonitorError::NotTracing));

    monitor.start().unwrap();
    assert!(monitor.is_tracing());
    assert_eq!(monitor.start(), Err(MonitorError::AlreadyTracing));

    monitor.stop().unwrap();
    assert!(!monitor.is_tracing());
}

#[test]
fn test_events_after_stop_are_not_observed() {
    let fixture = fixture(SOURCE);
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix(&fixture.prefix));

    monitor.start().unwrap();
    dispatch::emit(EventKind::Call, &frame(&fixture, 1, &[("values", "[1]")]));
    monitor.stop().unwrap();
    dispatch::emit(EventKind::Line, &frame(&fixture, 2, &[("values", "['x']")]));

    let results = monitor.results();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_conformant());
}

#[test]
fn test_session_guard_stops_on_panic() {
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix("/nowhere"));

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        monitor.run(|| panic!("target program failed")).unwrap();
    }));

    assert!(outcome.is_err());
    assert!(!monitor.is_tracing());
}

#[test]
fn test_run_returns_program_value() {
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix("/nowhere"));

    assert_eq!(monitor.run(|| 42), Ok(42));
    assert!(!monitor.is_tracing());

    let session = monitor.session().unwrap();
    assert!(session.monitor().is_tracing());
    drop(session);
    assert!(!monitor.is_tracing());
}

#[test]
fn test_stale_session_guard_leaves_new_session_running() {
    let fixture = fixture(SOURCE);
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix(&fixture.prefix));

    let stale = monitor.session().unwrap();
    monitor.stop().unwrap();
    monitor.start().unwrap();
    drop(stale);

    assert!(monitor.is_tracing());
    dispatch::emit(EventKind::Call, &frame(&fixture, 1, &[("values", "[1]")]));
    assert_eq!(monitor.results().len(), 1);

    monitor.stop().unwrap();
    assert!(!monitor.is_tracing());
}

#[test]
fn test_restart_clears_results() {
    let fixture = fixture(SOURCE);
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix(&fixture.prefix));

    monitor
        .run(|| dispatch::emit(EventKind::Call, &frame(&fixture, 1, &[("values", "[1]")])))
        .unwrap();
    assert_eq!(monitor.results().len(), 1);

    monitor.run(|| ()).unwrap();
    assert!(monitor.results().is_empty());
}

#[test]
fn test_events_from_many_threads() {
    let fixture = Arc::new(fixture(SOURCE));
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix(&fixture.prefix));

    monitor
        .run(|| {
            let handles = (0..4)
                .map(|_| {
                    let fixture = Arc::clone(&fixture);
                    thread::spawn(move || {
                        for _ in 0..25 {
                            dispatch::emit(EventKind::Line, &frame(&fixture, 2, &[("values", "[1]")]));
                        }
                    })
                })
                .collect::<Vec<_>>();
            for handle in handles {
                handle.join().unwrap();
            }
        })
        .unwrap();

    assert_eq!(monitor.results().len(), 100);
}

struct Counter(AtomicUsize);

impl Subscriber for Counter {
    fn on_event(&self, _kind: EventKind, frame: &Frame) {
        // other tests emit concurrently
        if frame.file == "/nowhere/counted.py" {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn test_dispatch_subscribe_unsubscribe() {
    let counter = Arc::new(Counter(AtomicUsize::new(0)));
    let frame = Frame::new("/nowhere/counted.py", 1, Namespace::new(), &Arc::new(Namespace::new()));

    let id = dispatch::subscribe(Arc::clone(&counter) as Arc<dyn Subscriber>);
    dispatch::emit(EventKind::Call, &frame);
    dispatch::emit(EventKind::Return, &frame);
    assert!(dispatch::unsubscribe(id));
    assert!(!dispatch::unsubscribe(id));
    dispatch::emit(EventKind::Line, &frame);

    assert_eq!(counter.0.load(Ordering::SeqCst), 2);
}
