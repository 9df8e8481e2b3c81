//! Concurrent orchestration of checkers.
//!
//! Every registered checker runs in its own tokio task. Outcomes are
//! collected by joining the tasks in registration order, so merging needs
//! no shared mutable state and duplicate findings always resolve in favour
//! of the earliest registered checker, whatever order the tasks finish in.
//!
//! # Example
//!
//! ```no_run
//! use droidgate::runner::Runner;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() {
//!     let runner = Runner::with_default_checkers();
//!     let result = runner.run(Path::new("./my-app"), None).await;
//!     for finding in &result.findings {
//!         println!("{}", finding);
//!     }
//! }
//! ```

use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::checker::{default_checkers, Checker};
use crate::error::CheckerError;
use crate::model::{CheckOutcome, CheckerStatus, Finding, ScanMetadata, ScanResult};

/// Called once per checker, with its id, as soon as that checker finishes.
pub type OnComplete = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
pub struct Runner {
    checkers: Vec<Arc<dyn Checker>>,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_checkers() -> Self {
        let mut runner = Self::new();
        for checker in default_checkers() {
            runner.register(checker);
        }
        runner
    }

    pub fn register(&mut self, checker: Arc<dyn Checker>) {
        self.checkers.push(checker);
    }

    pub fn checkers(&self) -> &[Arc<dyn Checker>] {
        &self.checkers
    }

    /// Runs all checkers concurrently and waits for every one of them.
    ///
    /// Must be called from within a tokio runtime. Checker failures and
    /// panics are recorded on the checker's entry; the result is always
    /// complete.
    pub async fn run(&self, project_root: &Path, on_complete: Option<OnComplete>) -> ScanResult {
        let started_at = Utc::now();
        let clock = Instant::now();
        let checker_ids: Vec<String> = self.checkers.iter().map(|c| c.id().to_string()).collect();

        info!(
            project = %project_root.display(),
            checkers = checker_ids.len(),
            "Starting scan"
        );

        let handles: Vec<_> = self
            .checkers
            .iter()
            .map(|checker| {
                let checker = Arc::clone(checker);
                let root = project_root.to_path_buf();
                let on_complete = on_complete.clone();
                tokio::spawn(async move {
                    let result = AssertUnwindSafe(checker.execute(&root))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|_| {
                            Err(CheckerError::Execution("checker panicked".to_string()))
                        });
                    if let Some(callback) = on_complete {
                        callback(checker.id());
                    }
                    result
                })
            })
            .collect();

        let joined = join_all(handles).await;

        let mut findings = Vec::new();
        let mut checkers = BTreeMap::new();
        let mut total_passed = 0;
        let mut total_failed = 0;

        for (checker, result) in self.checkers.iter().zip(joined) {
            let id = checker.id().to_string();
            let result = result.unwrap_or_else(|e| Err(CheckerError::Execution(e.to_string())));

            let status = match result {
                Ok(CheckOutcome {
                    passed,
                    findings: reported,
                    ..
                }) => {
                    let status = CheckerStatus {
                        passed,
                        finding_count: reported.len(),
                        error: None,
                    };
                    findings.extend(reported);
                    status
                }
                Err(err) => {
                    warn!(checker = %id, code = err.code(), "Checker failed: {}", err);
                    CheckerStatus {
                        passed: false,
                        finding_count: 0,
                        error: Some(err.to_string()),
                    }
                }
            };

            if status.passed {
                total_passed += 1;
            } else {
                total_failed += 1;
            }
            checkers.insert(id, status);
        }

        let mut findings = dedup_findings(findings);
        sort_findings(&mut findings);

        let finished_at = Utc::now();
        let duration = clock.elapsed();

        info!(
            findings = findings.len(),
            passed = total_passed,
            failed = total_failed,
            duration_ms = duration.as_millis() as u64,
            "Scan complete"
        );

        ScanResult {
            findings,
            checkers,
            total_passed,
            total_failed,
            metadata: ScanMetadata {
                project_root: project_root.to_path_buf(),
                started_at,
                finished_at,
                duration,
                checker_ids,
            },
        }
    }
}

/// Drops findings whose `(rule_id, position)` was already seen. The first occurrence wins.
pub fn dedup_findings(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = HashSet::with_capacity(findings.len());
    findings
        .into_iter()
        .filter(|f| seen.insert((f.rule_id.clone(), f.position.to_string())))
        .collect()
}

/// Most severe first, then by rule id, then by position.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by_cached_key(|f| (Reverse(f.severity), f.rule_id.clone(), f.position.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::ManifestChecker;
    use crate::error::ManifestError;
    use crate::model::{Position, Severity};
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    enum Behavior {
        Report { passed: bool, findings: Vec<Finding> },
        Missing,
        Panic,
    }

    struct MockChecker {
        id: String,
        delay_ms: u64,
        behavior: Behavior,
    }

    impl MockChecker {
        fn reporting(id: &str, findings: Vec<Finding>) -> Self {
            Self {
                id: id.to_string(),
                delay_ms: 0,
                behavior: Behavior::Report {
                    passed: findings.is_empty(),
                    findings,
                },
            }
        }

        fn passing_with(id: &str, findings: Vec<Finding>) -> Self {
            Self {
                id: id.to_string(),
                delay_ms: 0,
                behavior: Behavior::Report {
                    passed: true,
                    findings,
                },
            }
        }

        fn missing(id: &str) -> Self {
            Self {
                id: id.to_string(),
                delay_ms: 0,
                behavior: Behavior::Missing,
            }
        }

        fn delayed(mut self, ms: u64) -> Self {
            self.delay_ms = ms;
            self
        }
    }

    #[async_trait]
    impl Checker for MockChecker {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            "Mock"
        }

        fn description(&self) -> &str {
            "Reports a fixed outcome"
        }

        async fn execute(&self, project_root: &Path) -> Result<CheckOutcome, CheckerError> {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            match &self.behavior {
                Behavior::Report { passed, findings } => Ok(CheckOutcome {
                    checker_id: self.id.clone(),
                    passed: *passed,
                    findings: findings.clone(),
                }),
                Behavior::Missing => Err(ManifestError::NotFound {
                    root: project_root.to_path_buf(),
                }
                .into()),
                Behavior::Panic => panic!("mock checker exploded"),
            }
        }
    }

    fn finding(rule: &str, severity: Severity, file: &str, line: u32) -> Finding {
        Finding::new(rule, format!("{} finding", rule), severity, Position::at_line(file, line))
    }

    #[tokio::test]
    async fn test_no_checkers() {
        let result = Runner::new().run(Path::new("/tmp"), None).await;
        assert!(result.findings.is_empty());
        assert!(result.checkers.is_empty());
        assert_eq!(result.total_passed + result.total_failed, 0);
    }

    #[tokio::test]
    async fn test_multiple_checkers_sorted() {
        let mut runner = Runner::new();
        runner.register(Arc::new(MockChecker::reporting(
            "a",
            vec![finding("W001", Severity::Warning, "a.java", 1)],
        )));
        runner.register(Arc::new(MockChecker::reporting("b", vec![])));
        runner.register(Arc::new(MockChecker::reporting(
            "c",
            vec![
                finding("C001", Severity::Critical, "c.java", 3),
                finding("E001", Severity::Error, "c.java", 2),
            ],
        )));

        let result = runner.run(Path::new("/tmp"), None).await;
        let severities: Vec<_> = result.findings.iter().map(|f| f.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Critical, Severity::Error, Severity::Warning]
        );
        assert_eq!(result.total_passed, 1);
        assert_eq!(result.total_failed, 2);
        assert_eq!(result.checkers["c"].finding_count, 2);
    }

    #[tokio::test]
    async fn test_duplicate_findings_across_checkers() {
        let mut runner = Runner::new();
        for id in ["one", "two"] {
            runner.register(Arc::new(MockChecker::reporting(
                id,
                vec![finding("DUP", Severity::Warning, "a.java", 10)],
            )));
        }
        let result = runner.run(Path::new("/tmp"), None).await;
        assert_eq!(result.findings.iter().filter(|f| f.rule_id == "DUP").count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_tie_break_is_registration_order() {
        let first = finding("DUP", Severity::Warning, "a.java", 10).with_description("from first");
        let second = finding("DUP", Severity::Warning, "a.java", 10).with_description("from second");

        let mut runner = Runner::new();
        // the first-registered checker finishes last
        runner.register(Arc::new(MockChecker::reporting("slow", vec![first]).delayed(50)));
        runner.register(Arc::new(MockChecker::reporting("fast", vec![second])));

        let result = runner.run(Path::new("/tmp"), None).await;
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].description, "from first");
    }

    #[tokio::test]
    async fn test_one_failing_checker_does_not_affect_others() {
        let mut runner = Runner::new();
        runner.register(Arc::new(MockChecker::passing_with(
            "code",
            vec![finding("CS001", Severity::Warning, "Main.java", 4)],
        )));
        runner.register(Arc::new(MockChecker::missing("manifest")));
        runner.register(Arc::new(MockChecker::passing_with(
            "datasafety",
            vec![finding("DS001", Severity::Error, "privacy.html", 1)],
        )));

        let result = runner.run(Path::new("/tmp/project"), None).await;
        assert_eq!(result.total_failed, 1);
        assert_eq!(result.total_passed, 2);

        let rules: Vec<_> = result.findings.iter().map(|f| f.rule_id.as_str()).collect();
        assert_eq!(rules, vec!["DS001", "CS001"]);

        let status = &result.checkers["manifest"];
        assert!(!status.passed);
        assert!(status.error.as_deref().unwrap().contains("not found"));
        assert_eq!(result.errors().count(), 1);
    }

    #[tokio::test]
    async fn test_panicking_checker_is_recorded() {
        let mut runner = Runner::new();
        runner.register(Arc::new(MockChecker {
            id: "boom".to_string(),
            delay_ms: 0,
            behavior: Behavior::Panic,
        }));
        runner.register(Arc::new(MockChecker::reporting("ok", vec![])));

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let result = runner
            .run(
                Path::new("/tmp"),
                Some(Arc::new(move |_: &str| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })),
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.total_failed, 1);
        assert_eq!(result.total_passed, 1);
        assert!(result.checkers["boom"].error.is_some());
    }

    #[tokio::test]
    async fn test_on_complete_fires_once_per_checker() {
        let mut runner = Runner::new();
        for id in ["s1", "s2", "s3"] {
            runner.register(Arc::new(MockChecker::reporting(id, vec![])));
        }
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        runner
            .run(
                Path::new("/tmp"),
                Some(Arc::new(move |id: &str| sink.lock().unwrap().push(id.to_string()))),
            )
            .await;

        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec!["s1", "s2", "s3"]);
    }

    #[tokio::test]
    async fn test_metadata() {
        let mut runner = Runner::new();
        runner.register(Arc::new(MockChecker::reporting("m1", vec![])));
        runner.register(Arc::new(MockChecker::reporting("m2", vec![])));
        assert_eq!(runner.checkers().len(), 2);

        let result = runner.run(Path::new("/some/path"), None).await;
        assert_eq!(result.metadata.project_root, PathBuf::from("/some/path"));
        assert_eq!(result.metadata.checker_ids, vec!["m1", "m2"]);
        assert!(result.metadata.finished_at >= result.metadata.started_at);
    }

    #[tokio::test]
    async fn test_manifest_checker_end_to_end() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("AndroidManifest.xml"),
            r#"<manifest>
<uses-sdk android:targetSdkVersion="30"/>
<uses-permission android:name="android.permission.CAMERA"/>
<application android:usesCleartextTraffic="true"/>
</manifest>"#,
        )
        .unwrap();

        let mut runner = Runner::new();
        runner.register(Arc::new(ManifestChecker::new()));
        let result = runner.run(dir.path(), None).await;

        let rules: Vec<_> = result.findings.iter().map(|f| f.rule_id.as_str()).collect();
        assert_eq!(rules, vec!["SDK001", "MV004", "DP003", "MV002"]);
        assert_eq!(result.total_failed, 1);
    }

    #[test]
    fn test_sort_total_order() {
        let mut findings = vec![
            finding("X", Severity::Warning, "f", 1),
            finding("X", Severity::Critical, "f", 1),
            finding("X", Severity::Error, "f", 1),
        ];
        sort_findings(&mut findings);
        let severities: Vec<_> = findings.iter().map(|f| f.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Critical, Severity::Error, Severity::Warning]
        );
    }

    #[test]
    fn test_sort_ties_by_rule_then_position() {
        let mut findings = vec![
            finding("B", Severity::Error, "f", 2),
            finding("A", Severity::Error, "g", 1),
            finding("B", Severity::Error, "f", 1),
        ];
        sort_findings(&mut findings);
        let keys: Vec<_> = findings
            .iter()
            .map(|f| format!("{}@{}", f.rule_id, f.position))
            .collect();
        assert_eq!(keys, vec!["A@g:1", "B@f:1", "B@f:2"]);
    }

    fn arb_finding() -> impl Strategy<Value = Finding> {
        (
            prop_oneof![Just("A"), Just("B"), Just("C")],
            prop_oneof![
                Just(Severity::Info),
                Just(Severity::Warning),
                Just(Severity::Error),
                Just(Severity::Critical)
            ],
            0u32..4,
        )
            .prop_map(|(rule, severity, line)| finding(rule, severity, "x.xml", line))
    }

    proptest! {
        #[test]
        fn dedup_is_idempotent(findings in proptest::collection::vec(arb_finding(), 0..40)) {
            let once = dedup_findings(findings);
            let twice = dedup_findings(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn sorted_output_is_ordered(findings in proptest::collection::vec(arb_finding(), 0..40)) {
            let mut sorted = dedup_findings(findings);
            sort_findings(&mut sorted);
            for pair in sorted.windows(2) {
                prop_assert!(pair[0].severity >= pair[1].severity);
            }
        }
    }
}
