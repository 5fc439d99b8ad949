//! Test reporter - display test results and frame-graph diagnostics

use crate::error::{DriverResult, LoadError};
use crate::executor::{FailureDetail, TestOutcome};
use crate::frames::{FrameGraph, FrameSummary};
use crate::host::MemoryProbe;
use crate::runner::Tally;
use crate::suite::SuiteReport;
use colored::*;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Error strings longer than this are shortened
pub const MAX_ERROR_CHARS: usize = 2500;

/// Characters kept from each end of a shortened error string
const KEPT_CHARS: usize = MAX_ERROR_CHARS / 2;

/// Joins the kept head and tail of a shortened error string
pub const ELLIPSIS: &str = " ... ";

/// Pack an error string onto one line, keeping its beginning and end.
///
/// Newlines and tabs become spaces. Strings over [`MAX_ERROR_CHARS`]
/// characters keep the first and last 1250 characters around [`ELLIPSIS`].
pub fn sanitize_error(error: &str) -> String {
    let flat: String = error
        .chars()
        .map(|c| if c == '\n' || c == '\t' { ' ' } else { c })
        .collect();

    let len = flat.chars().count();
    if len <= MAX_ERROR_CHARS {
        return flat;
    }

    let head: String = flat.chars().take(KEPT_CHARS).collect();
    let tail: String = flat.chars().skip(len - KEPT_CHARS).collect();
    format!("{}{}{}", head, ELLIPSIS, tail)
}

/// Turn tabs and newlines into spaces and collapse runs of spaces
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;

    for c in text.chars() {
        let c = if c == '\t' || c == '\n' { ' ' } else { c };
        if c == ' ' {
            if last_was_space {
                continue;
            }
            last_was_space = true;
        } else {
            last_was_space = false;
        }
        out.push(c);
    }

    out
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Test reporter with output configuration
pub struct TestReporter<'a> {
    out: Box<dyn Write + 'a>,
    memory: &'a dyn MemoryProbe,
    /// Print success and progress lines too
    verbose: bool,
    /// Disable colored output
    no_color: bool,
}

impl<'a> TestReporter<'a> {
    /// Create a reporter writing to `out`
    pub fn new(out: impl Write + 'a, memory: &'a dyn MemoryProbe) -> Self {
        Self {
            out: Box::new(out),
            memory,
            verbose: false,
            no_color: false,
        }
    }

    /// Create a reporter writing to standard output
    pub fn stdout(memory: &'a dyn MemoryProbe) -> Self {
        Self::new(io::stdout(), memory)
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Disable colored output
    pub fn with_no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    fn failed_label(&self) -> String {
        if self.no_color {
            "TEST FAILED".to_string()
        } else {
            "TEST FAILED".red().bold().to_string()
        }
    }

    fn succeeded_label(&self) -> String {
        if self.no_color {
            "TEST SUCCEEDED".to_string()
        } else {
            "TEST SUCCEEDED".green().to_string()
        }
    }

    /// Announce a test about to run (verbose only)
    pub fn test_starting(&mut self, unit_name: &str, test_name: &str) -> DriverResult<()> {
        if self.verbose {
            writeln!(
                self.out,
                "{} -- {} {} : TEST STARTING",
                timestamp(),
                unit_name,
                test_name
            )?;
        }
        Ok(())
    }

    /// Report a single test outcome and return its pass/fail delta
    pub fn report(
        &mut self,
        unit_name: &str,
        test_name: &str,
        outcome: &TestOutcome,
        elapsed: Duration,
    ) -> DriverResult<Tally> {
        match outcome {
            TestOutcome::Success => {
                if self.verbose {
                    let megabytes = self.memory.current_bytes_used() as f64 / (1024.0 * 1024.0);
                    writeln!(
                        self.out,
                        "{} -- {} {} : {} in {:.4} . memory usage is {:.2} MB",
                        timestamp(),
                        unit_name,
                        test_name,
                        self.succeeded_label(),
                        elapsed.as_secs_f64(),
                        megabytes
                    )?;
                }
                Ok(Tally::passed(1))
            }
            TestOutcome::Failure(detail) => {
                let detail = match detail {
                    FailureDetail::Raised(exception) => {
                        format!("throw {}", sanitize_error(exception.payload()))
                    }
                    FailureDetail::NotTrue(value) => format!("{} is not true", value),
                };
                writeln!(
                    self.out,
                    "{} -- {}: {} {} : {}",
                    timestamp(),
                    self.failed_label(),
                    unit_name,
                    test_name,
                    detail
                )?;
                Ok(Tally::failed(1))
            }
        }
    }

    /// Report a unit that could not be loaded
    pub fn load_failure(&mut self, path: &Path, error: &LoadError) -> DriverResult<()> {
        writeln!(
            self.out,
            "Failed to import unit {}: {}",
            path.display(),
            sanitize_error(&error.to_string())
        )?;
        Ok(())
    }

    /// Report how long the reasoning engine took on a test
    pub fn reasoning_timing(
        &mut self,
        unit_name: &str,
        test_name: &str,
        elapsed: Duration,
    ) -> DriverResult<()> {
        writeln!(
            self.out,
            "reasoning {}.{} took {:.4}",
            unit_name,
            test_name,
            elapsed.as_secs_f64()
        )?;
        Ok(())
    }

    /// Print every unresolved frame with its path, then a one-line summary
    /// when any unknown apply nodes were found.
    pub fn frame_summary<G: FrameGraph>(
        &mut self,
        unit_name: &str,
        test_name: &str,
        summary: &FrameSummary<G::Frame>,
        graph: &G,
    ) -> DriverResult<()> {
        for unresolved in &summary.unresolved {
            writeln!(self.out, "Found {} in", unresolved.unknown_applies)?;
            for frame in unresolved.path.iter().chain(Some(&unresolved.frame)) {
                let descriptor = format!(
                    "{} {}",
                    graph.graph_name(frame),
                    graph.entry_signature(frame)
                );
                writeln!(self.out, "\t{}", collapse_whitespace(&descriptor))?;
            }
        }

        let bad_nodes = summary.bad_nodes();
        if bad_nodes > 0 {
            writeln!(
                self.out,
                "{}.{} reaching {} of {} frames with {} bad nodes.",
                unit_name, test_name, summary.reachable, summary.total, bad_nodes
            )?;
        }
        Ok(())
    }

    /// Print the final suite line
    pub fn suite_summary(&mut self, report: &SuiteReport) -> DriverResult<()> {
        writeln!(
            self.out,
            "SEMANTIC TESTS EXECUTED. {} passed, {} failed. in {:.3}s",
            report.passed,
            report.failed,
            report.elapsed.as_secs_f64()
        )?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::UnresolvedFrame;
    use crate::host::RuntimeException;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    struct FixedProbe(u64);

    impl MemoryProbe for FixedProbe {
        fn current_bytes_used(&self) -> u64 {
            self.0
        }
    }

    fn capture(verbose: bool, f: impl FnOnce(&mut TestReporter<'_>)) -> String {
        let probe = FixedProbe(3 * 1024 * 1024);
        let mut buf = Vec::new();
        {
            let mut reporter = TestReporter::new(&mut buf, &probe)
                .with_verbose(verbose)
                .with_no_color(true);
            f(&mut reporter);
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_success_counts_and_is_quiet() {
        let mut tally = Tally::default();
        let out = capture(false, |r| {
            tally = r
                .report("math.sem", "addition", &TestOutcome::Success, Duration::ZERO)
                .unwrap();
        });
        assert_eq!(tally, Tally::passed(1));
        assert_eq!(out, "");
    }

    #[test]
    fn test_success_verbose_line() {
        let out = capture(true, |r| {
            r.report(
                "math.sem",
                "addition",
                &TestOutcome::Success,
                Duration::from_millis(1500),
            )
            .unwrap();
        });
        assert!(out.contains(" -- math.sem addition : TEST SUCCEEDED in 1.5000 ."));
        assert!(out.contains("memory usage is 3.00 MB"));
    }

    #[test]
    fn test_failure_printed_even_when_quiet() {
        let mut tally = Tally::default();
        let outcome =
            TestOutcome::Failure(FailureDetail::Raised(RuntimeException::new("bad\nthing")));
        let out = capture(false, |r| {
            tally = r
                .report("math.sem", "division", &outcome, Duration::ZERO)
                .unwrap();
        });
        assert_eq!(tally, Tally::failed(1));
        assert!(out.contains("TEST FAILED: math.sem division : throw bad thing"));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_not_true_value() {
        let outcome = TestOutcome::Failure(FailureDetail::NotTrue("42".to_string()));
        let out = capture(false, |r| {
            r.report("math.sem", "answer", &outcome, Duration::ZERO)
                .unwrap();
        });
        assert!(out.contains("TEST FAILED: math.sem answer : 42 is not true"));
    }

    #[test]
    fn test_starting_line_only_when_verbose() {
        let quiet = capture(false, |r| r.test_starting("u.sem", "t").unwrap());
        let verbose = capture(true, |r| r.test_starting("u.sem", "t").unwrap());
        assert_eq!(quiet, "");
        assert!(verbose.ends_with(" -- u.sem t : TEST STARTING\n"));
    }

    #[test]
    fn test_sanitize_short_string() {
        assert_eq!(sanitize_error("a\tb\nc"), "a b c");
    }

    #[test]
    fn test_sanitize_boundary() {
        let exact = "x".repeat(MAX_ERROR_CHARS);
        assert_eq!(sanitize_error(&exact), exact);

        let over = format!("{}{}", "a".repeat(1250), "b".repeat(1251));
        let sanitized = sanitize_error(&over);
        assert_eq!(sanitized.chars().count(), 1250 + ELLIPSIS.len() + 1250);
        assert!(sanitized.starts_with(&"a".repeat(1250)));
        assert!(sanitized.ends_with(&"b".repeat(1250)));
    }

    #[test]
    fn test_sanitize_multibyte() {
        let text = "é".repeat(3000);
        let sanitized = sanitize_error(&text);
        assert_eq!(sanitized.chars().count(), 2505);
    }

    proptest! {
        #[test]
        fn test_sanitize_keeps_head_and_tail(s in "[a-z\\n\\t ]{0,4000}") {
            let flat: String = s.chars().map(|c| if c == '\n' || c == '\t' { ' ' } else { c }).collect();
            let sanitized = sanitize_error(&s);
            let len = flat.chars().count();

            if len <= MAX_ERROR_CHARS {
                prop_assert_eq!(sanitized, flat);
            } else {
                prop_assert_eq!(sanitized.chars().count(), 2 * KEPT_CHARS + ELLIPSIS.len());
                let head: String = flat.chars().take(KEPT_CHARS).collect();
                let tail: String = flat.chars().skip(len - KEPT_CHARS).collect();
                prop_assert!(sanitized.starts_with(&head));
                prop_assert!(sanitized.ends_with(&tail));
            }
        }

        #[test]
        fn test_collapse_leaves_no_runs(s in "[a-c \\t\\n]{0,200}") {
            let collapsed = collapse_whitespace(&s);
            prop_assert!(!collapsed.contains("  "));
            prop_assert!(!collapsed.contains('\t'));
            prop_assert!(!collapsed.contains('\n'));
        }
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("f\t\t(x,\n   y)"), "f (x, y)");
        assert_eq!(collapse_whitespace("plain"), "plain");
    }

    struct Labels;

    impl FrameGraph for Labels {
        type Frame = u32;

        fn unknown_apply_count(&self, _frame: &u32) -> usize {
            0
        }

        fn subframes_for(&self, _frame: &u32) -> Vec<(String, u32)> {
            Vec::new()
        }

        fn graph_name(&self, frame: &u32) -> String {
            format!("graph{}", frame)
        }

        fn entry_signature(&self, frame: &u32) -> String {
            format!("({},\n\t  `Member)", frame)
        }

        fn total_frame_count(&self) -> usize {
            10
        }
    }

    #[test]
    fn test_frame_summary_rendering() {
        let summary = FrameSummary {
            reachable: 3,
            total: 10,
            unresolved: vec![
                UnresolvedFrame {
                    frame: 2,
                    unknown_applies: 2,
                    path: vec![0, 1],
                },
                UnresolvedFrame {
                    frame: 0,
                    unknown_applies: 1,
                    path: vec![],
                },
            ],
        };

        let out = capture(false, |r| {
            r.frame_summary("math.sem", "addition", &summary, &Labels)
                .unwrap();
        });

        assert_eq!(
            out,
            "Found 2 in\n\
             \tgraph0 (0, `Member)\n\
             \tgraph1 (1, `Member)\n\
             \tgraph2 (2, `Member)\n\
             Found 1 in\n\
             \tgraph0 (0, `Member)\n\
             math.sem.addition reaching 3 of 10 frames with 3 bad nodes.\n"
        );
    }

    #[test]
    fn test_frame_summary_suppressed_when_resolved() {
        let summary: FrameSummary<u32> = FrameSummary {
            reachable: 4,
            total: 4,
            unresolved: vec![],
        };
        let out = capture(true, |r| {
            r.frame_summary("math.sem", "addition", &summary, &Labels)
                .unwrap();
        });
        assert_eq!(out, "");
    }

    #[test]
    fn test_suite_summary_line() {
        let report = SuiteReport {
            passed: 3,
            failed: 2,
            elapsed: Duration::from_millis(250),
        };
        let out = capture(false, |r| r.suite_summary(&report).unwrap());
        assert_eq!(out, "SEMANTIC TESTS EXECUTED. 3 passed, 2 failed. in 0.250s\n");
    }

    #[test]
    fn test_load_failure_stays_on_one_line() {
        let error = LoadError::new("suite/math.sem", "line 3, column 10: invalid string\nexpected `\"`");
        let out = capture(false, |r| {
            r.load_failure(Path::new("suite/math.sem"), &error).unwrap()
        });
        assert_eq!(
            out,
            "Failed to import unit suite/math.sem: line 3, column 10: invalid string expected `\"`\n"
        );
    }
}
