// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Credit-compatibility filtering through the pipeline, per policy.
#![allow(clippy::unwrap_used)]

use curriculum_core::credit::{Criterion, Exclusion};
use curriculum_core::export::filter_rows;
use curriculum_core::{
    CoursePair, CourseCode, CreditPolicy, CreditTable, Pipeline, ScoringConfig, Verdict,
    WorkloadTable,
};
use curriculum_dry_tests::{accented_catalog, NoEmbeddings};

fn code(s: &str) -> CourseCode {
    CourseCode::new(s).unwrap()
}

fn pair(a: &str, b: &str) -> CoursePair {
    CoursePair::new(code(a), code(b))
}

fn pipeline(policy: CreditPolicy) -> Pipeline {
    Pipeline::new(ScoringConfig {
        credit_policy: policy,
        workers: 1,
        ..ScoringConfig::default()
    })
}

#[test]
fn monotonic_policy_rows() {
    let credits: CreditTable = [(code("A"), 3), (code("B"), 5), (code("C"), 6), (code("D"), 4)]
        .into_iter()
        .collect();
    let report = pipeline(CreditPolicy::Monotonic).filter(
        &[pair("A", "B"), pair("C", "D"), pair("A", "X")],
        &credits,
        &WorkloadTable::default(),
    );
    let rows = filter_rows(&report);

    assert!(rows[0].kept);
    assert_eq!(rows[0].credit_delta, Some(2));

    assert!(!rows[1].kept);
    assert!(rows[1].reason_or_criterion.contains('6'));
    assert!(rows[1].reason_or_criterion.contains('4'));

    assert!(!rows[2].kept);
    assert!(rows[2].reason_or_criterion.contains("code not found"));
}

#[test]
fn workload_policies_over_catalog_data() {
    let out = pipeline(CreditPolicy::Exact)
        .run(&accented_catalog(), &NoEmbeddings)
        .unwrap();
    let workloads = out.workloads();
    let credits = CreditTable::from_workloads(&workloads);
    // 4-0-0-6 vs 4-0-0-4, 3-0-0-4 vs 6-0-0-5
    let pairs = [
        pair("BCN0402-15", "BCN0407-15"),
        pair("BCM0504-15", "MCTA0001-17"),
    ];

    let exact = pipeline(CreditPolicy::Exact).filter(&pairs, &credits, &workloads);
    assert_eq!(exact.kept(), 0);

    let approx = pipeline(CreditPolicy::Approximate { delta: 2 }).filter(&pairs, &credits, &workloads);
    assert_eq!(
        approx.decisions[0].verdict,
        Verdict::Kept(Criterion::Redistribution)
    );
    assert_eq!(
        approx.decisions[1].verdict,
        Verdict::Excluded(Exclusion::OutsideTolerance { distance: 4, delta: 2 })
    );

    let monotonic = pipeline(CreditPolicy::Monotonic).filter(&pairs, &credits, &workloads);
    assert_eq!(monotonic.decisions[0].credit_delta(), Some(0));
    assert_eq!(monotonic.decisions[1].credit_delta(), Some(3));
}

#[test]
fn missing_workload_is_never_a_match() {
    let workloads: WorkloadTable = WorkloadTable::default();
    let credits = CreditTable::default();
    for policy in [
        CreditPolicy::Monotonic,
        CreditPolicy::Exact,
        CreditPolicy::approximate(),
    ] {
        let report = pipeline(policy).filter(&[pair("A", "A")], &credits, &workloads);
        assert_eq!(
            report.decisions[0].verdict,
            Verdict::Excluded(Exclusion::CodeNotFound(code("A")))
        );
    }
}

#[test]
fn pairs_read_from_json_use_trimmed_codes() {
    let credits: CreditTable = [(code("A"), 3), (code("B"), 5)].into_iter().collect();
    let pairs: Vec<CoursePair> =
        serde_json::from_str(r#"[{"course_a": " A", "course_b": "B  "}]"#).unwrap();
    let report = pipeline(CreditPolicy::Monotonic).filter(&pairs, &credits, &WorkloadTable::default());
    assert_eq!(report.decisions[0].verdict, Verdict::Kept(Criterion::Monotonic { delta: 2 }));

    assert!(serde_json::from_str::<CoursePair>(r#"{"course_a": "A", "course_b": ""}"#).is_err());
}
