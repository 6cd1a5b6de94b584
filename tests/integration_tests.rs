//! End-to-end tests: programs on disk are "executed" by emitting the
//! call/line/return events an interpreter would report, and the monitor's
//! results are checked against the programs' `# pydytype:` tags.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
};

use lazy_static::lazy_static;
use regex::Regex;

use pydytype::{
    comments::comments::parse_module_comments,
    config::MonitorConfig,
    format_error,
    harness::{expects_failure, unexpected_failures},
    monitor::{
        dispatch::emit,
        events::{EventKind, Frame},
        result::CheckResult,
    },
    parse_module,
    runtime::{
        literal::literal_eval,
        namespace::Namespace,
        types::TypeObject,
        value::Value,
    },
    type_checker::type_checker::Outcome,
    TypeMonitor,
};

lazy_static! {
    static ref CALL: Regex = Regex::new(r"^\s+(\w+)\((.*)\)\s*$").unwrap();
}

/// A checked program and the module globals its frames share.
struct Program {
    path: String,
    source: String,
    globals: Arc<Namespace>,
}

impl Program {
    fn load(path: &Path) -> Self {
        Self::with_globals(path, Namespace::new())
    }

    fn with_globals(path: &Path, mut globals: Namespace) -> Self {
        let source = fs::read_to_string(path).unwrap();
        globals.insert("__name__", Value::str("__main__"));
        for line in source.lines() {
            if let Some(name) = line.strip_prefix("def ").and_then(|rest| rest.split('(').next()) {
                globals.insert(name, Value::Function(name.to_string()));
            }
        }

        Program {
            path: path.to_string_lossy().to_string(),
            source,
            globals: Arc::new(globals),
        }
    }

    fn def_line(&self, function: &str) -> u32 {
        let header = format!("def {}(", function);
        let index = self
            .source
            .lines()
            .position(|line| line.trim_start().starts_with(&header))
            .unwrap();
        index as u32 + 1
    }

    /// Calls a one-statement function: entry on the `def` line, then the
    /// body line is executed and returns.
    fn call(&self, function: &str, locals: Namespace) {
        let entry = Frame::new(&self.path, self.def_line(function), locals, &self.globals);
        emit(EventKind::Call, &entry);

        let body = entry.at(entry.line + 1, entry.locals.clone());
        emit(EventKind::Line, &body);
        emit(EventKind::Return, &body);
    }

    /// Runs the calls of the `if __name__ == "__main__":` block, each with
    /// its literal argument bound to `a`.
    fn run_main(&self) {
        let main = self
            .source
            .lines()
            .position(|line| line.starts_with("if __name__"))
            .unwrap();

        for (index, line) in self.source.lines().enumerate().skip(main + 1) {
            let Some(captures) = CALL.captures(line) else {
                continue;
            };
            let module = Frame::new(&self.path, index as u32 + 1, (*self.globals).clone(), &self.globals);
            emit(EventKind::Line, &module);

            let argument = literal_eval(&captures[2]).unwrap();
            self.call(&captures[1], Namespace::new().with("a", argument));
        }
    }
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn failing_lines(results: &[CheckResult]) -> BTreeSet<u32> {
    results
        .iter()
        .filter(|result| !result.is_conformant())
        .map(|result| result.line)
        .collect()
}

fn run_fixture(name: &str) -> Vec<CheckResult> {
    let path = fixture(name);
    let program = Program::load(&path);
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix(&program.path));

    monitor.run(|| program.run_main()).unwrap();

    let results = monitor.results();
    let comments = parse_module_comments(&path).unwrap();
    assert!(!results.is_empty());

    let unexpected = unexpected_failures(&results, &comments);
    assert!(
        unexpected.is_empty(),
        "{}",
        unexpected.iter().map(|result| result.to_string()).collect::<Vec<_>>().join("\n")
    );

    // every tagged line really fails at least once
    let tagged = comments
        .keys()
        .copied()
        .filter(|line| expects_failure(&comments, *line))
        .collect::<BTreeSet<_>>();
    assert_eq!(failing_lines(&results), tagged);

    results
}

#[test]
fn test_list_fixture() {
    run_fixture("list.py");
}

#[test]
fn test_dict_fixture() {
    let results = run_fixture("dict.py");

    let malformed = results
        .into_iter()
        .filter(|result| matches!(result.outcome, Outcome::Malformed(_)))
        .map(|result| result.type_expression)
        .collect::<BTreeSet<_>>();
    assert_eq!(
        malformed,
        BTreeSet::from([String::from("dict[int:int]"), String::from("dict[str]")])
    );
}

#[test]
fn test_set_fixture() {
    run_fixture("set.py");
}

#[test]
fn test_composite_fixture() {
    run_fixture("composite.py");
}

const SCENARIOS: &str = "\
def scenario_a(a: list[int]):
    return a


def scenario_b(a: dict[str, int]):
    return a


def scenario_c(a: list[dict[int, set[str]]]):
    return a


def scenario_d(a: dict):
    return a
";

struct TempProgram {
    _dir: tempfile::TempDir,
    program: Program,
}

fn temp_program(source: &str, globals: Namespace) -> TempProgram {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenarios.py");
    fs::write(&path, source).unwrap();

    TempProgram {
        program: Program::with_globals(&path, globals),
        _dir: dir,
    }
}

fn outcomes_of(function: &str, argument: &str) -> Vec<Outcome> {
    let temp = temp_program(SCENARIOS, Namespace::new());
    let program = &temp.program;
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix(&program.path));

    monitor
        .run(|| program.call(function, Namespace::new().with("a", literal_eval(argument).unwrap())))
        .unwrap();

    monitor.results().into_iter().map(|result| result.outcome).collect()
}

#[test]
fn test_scenario_a_list_parameter() {
    assert_eq!(outcomes_of("scenario_a", "[1, 2, 3]"), vec![Outcome::Conformant; 3]);
    assert_eq!(outcomes_of("scenario_a", "[1, 'x']"), vec![Outcome::Mismatch; 3]);
}

#[test]
fn test_scenario_b_dict_keys() {
    assert_eq!(outcomes_of("scenario_b", "{'a': 1}"), vec![Outcome::Conformant; 3]);
    assert_eq!(outcomes_of("scenario_b", "{1: 2}"), vec![Outcome::Mismatch; 3]);
}

#[test]
fn test_scenario_c_nested() {
    assert_eq!(outcomes_of("scenario_c", "[{1: {'a'}}]"), vec![Outcome::Conformant; 3]);
    assert_eq!(outcomes_of("scenario_c", "[{1: {1}}]"), vec![Outcome::Mismatch; 3]);
}

#[test]
fn test_scenario_d_bare_dict() {
    assert_eq!(outcomes_of("scenario_d", "{1: 'b', 'c': 2}"), vec![Outcome::Conformant; 3]);
}

#[test]
fn test_scenario_e_nothing_after_stop() {
    let temp = temp_program(SCENARIOS, Namespace::new());
    let program = &temp.program;
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix(&program.path));

    monitor.start().unwrap();
    program.call("scenario_a", Namespace::new().with("a", literal_eval("[1]").unwrap()));
    monitor.stop().unwrap();
    let recorded = monitor.results().len();

    // the program keeps running
    program.call("scenario_a", Namespace::new().with("a", literal_eval("['x']").unwrap()));
    program.call("scenario_b", Namespace::new().with("a", literal_eval("{}").unwrap()));

    assert_eq!(recorded, 3);
    assert_eq!(monitor.results().len(), recorded);
}

#[test]
fn test_user_classes_and_local_annotations() {
    let source = "\
class Point:
    pass


def shift(points: list[Point], offset: 'int'):
    moved: list[Point] = points
    return moved
";
    let point = TypeObject::class("Point", vec![]);
    let other = TypeObject::class("Other", vec![]);
    let temp = temp_program(source, Namespace::new().with("Point", Value::Type(point.clone())));
    let program = &temp.program;
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix(&program.path));

    let points = Value::List(vec![Value::instance(&point, None)]);
    let mixed = Value::List(vec![Value::instance(&point, None), Value::instance(&other, None)]);

    monitor
        .run(|| {
            let entry = Frame::new(
                &program.path,
                5,
                Namespace::new()
                    .with("points", points.clone())
                    .with("offset", Value::Int(1)),
                &program.globals,
            );
            emit(EventKind::Call, &entry);
            emit(EventKind::Line, &entry.at(6, entry.locals.clone()));
            emit(
                EventKind::Line,
                &entry.at(7, entry.locals.clone().with("moved", mixed.clone())),
            );
        })
        .unwrap();

    let results = monitor.results();
    let summary = results
        .iter()
        .map(|result| (result.line, result.varname.as_str(), result.is_conformant()))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        vec![
            (5, "points", true),
            (5, "offset", true),
            (6, "points", true),
            (6, "offset", true),
            (7, "points", true),
            (7, "offset", true),
            (7, "moved", false),
        ]
    );
}

#[test]
fn test_threads_share_the_session() {
    let temp = Arc::new(temp_program(SCENARIOS, Namespace::new()));
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix(&temp.program.path));

    monitor
        .run(|| {
            let workers = ["scenario_a", "scenario_b", "scenario_c", "scenario_d"]
                .into_iter()
                .map(|function| {
                    let temp = Arc::clone(&temp);
                    thread::spawn(move || {
                        let argument = if function == "scenario_b" || function == "scenario_d" {
                            "{}"
                        } else {
                            "[]"
                        };
                        temp.program
                            .call(function, Namespace::new().with("a", literal_eval(argument).unwrap()));
                    })
                })
                .collect::<Vec<_>>();
            for worker in workers {
                worker.join().unwrap();
            }
        })
        .unwrap();

    let results = monitor.results();
    assert_eq!(results.len(), 12);
    assert!(results.iter().all(CheckResult::is_conformant));
}

#[test]
fn test_parse_module_and_error_rendering() {
    let table = parse_module(fixture("composite.py")).unwrap();
    assert_eq!(table.get(1, "a"), Some("list[set[int]]"));
    assert_eq!(table.get(6, "a"), Some("list[set[str]]"));
    assert_eq!(table.get(17, "a"), None);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.py");
    fs::write(&path, "def ok(a: int):\n    return a\n\nx = (1,\n").unwrap();

    let error = parse_module(&path).unwrap_err();
    let rendered = format_error(&error, &fs::read_to_string(&path).unwrap(), &path);
    assert!(rendered.starts_with("Error: "));
    assert!(rendered.contains("broken.py"));
}

#[test]
fn test_unparseable_program_is_reported_not_fatal() {
    let temp = temp_program("def f(a: int:\n    return a\n", Namespace::new());
    let program = &temp.program;
    let monitor = TypeMonitor::new(MonitorConfig::new().with_path_prefix(&program.path));

    monitor
        .run(|| program.call("f", Namespace::new().with("a", Value::Int(1))))
        .unwrap();

    assert!(monitor.results().is_empty());
    assert_eq!(monitor.parse_errors().len(), 1);
    assert!(!monitor.is_tracing());
}
