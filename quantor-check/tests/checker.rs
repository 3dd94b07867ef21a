use quantor_check::{
    CheckError, CheckOutcome, Checker, CheckerConfig, DefaultRanges, ProofObligation, RangeTable,
    TypeDesc,
};
use quantor_eval::{
    Binding, Context, EvalCx, Frame, Pattern, Predicate, QuantError, QuantifiedExpr, from_fn,
};
use quantor_values::{Interrupter, Value};

type BoxedPredicate = Box<dyn Predicate + Send + Sync>;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn int_of(env: &Context<'_>, name: &str) -> Result<i64, QuantError> {
    env.lookup(name)
        .and_then(Value::as_int)
        .ok_or_else(|| QuantError::UnresolvedName { name: name.into() })
}

fn x_satisfies(test: fn(i64) -> bool) -> BoxedPredicate {
    Box::new(from_fn(move |env: &Context<'_>, _: &mut EvalCx<'_>| {
        Ok(Value::Bool(test(int_of(env, "x")?)))
    }))
}

fn forall_nat(number: usize, test: fn(i64) -> bool) -> ProofObligation<BoxedPredicate> {
    let expr = QuantifiedExpr::forall(
        vec![Binding::typed(vec![Pattern::ident("x")], "nat")],
        x_satisfies(test),
    );
    ProofObligation::new(number, "subtype", expr)
}

fn nat_ranges() -> RangeTable {
    let mut table = RangeTable::new();
    let nats = DefaultRanges::default()
        .range_for(&TypeDesc::Nat)
        .expect("nat range");
    table.insert_set("x : nat", nats);
    table
}

#[test]
fn passing_obligation() {
    init_logs();
    let checker = Checker::new(CheckerConfig::default(), nat_ranges());
    let mut po = forall_nat(1, |x| x >= 0);
    let report = checker.check(&mut po);
    assert_eq!(report.outcome, CheckOutcome::Passed);
    assert!(report.to_string().starts_with("PO# 1, PASSED in "));
}

#[test]
fn failing_obligation_reports_counterexample() {
    init_logs();
    let checker = Checker::new(CheckerConfig::default(), nat_ranges());
    let mut po = forall_nat(2, |x| x < 3);
    let report = checker.check(&mut po);
    assert!(matches!(report.outcome, CheckOutcome::Failed { .. }));
    let text = report.to_string();
    assert!(text.starts_with("PO# 2, FAILED in "), "{text}");
    assert!(text.ends_with("Counterexample: x = 3"), "{text}");
}

#[test]
fn overrides_do_not_outlive_the_check() {
    init_logs();
    let checker = Checker::new(CheckerConfig::default(), nat_ranges());
    let mut po = forall_nat(1, |x| x < 3);
    checker.check(&mut po);
    assert!(po.bindings().iter().all(|b| b.overridden().is_none()));

    // failing checks clear them too
    let mut po = forall_nat(2, |x| x < 0);
    checker.check(&mut po);
    assert!(po.bindings().iter().all(|b| b.overridden().is_none()));
}

#[test]
fn unchecked_obligations_are_not_evaluated() {
    init_logs();
    let checker = Checker::new(CheckerConfig::default(), nat_ranges());
    let mut po = forall_nat(4, |_| panic!("must not run")).unchecked();
    let report = checker.check(&mut po);
    assert_eq!(report.outcome, CheckOutcome::Unchecked);
    assert_eq!(report.to_string(), "PO# 4, UNCHECKED");
}

#[test]
fn missing_range_is_noted_and_surfaces_as_error() {
    init_logs();
    let checker = Checker::new(CheckerConfig::default(), RangeTable::new());
    let mut po = forall_nat(5, |x| x >= 0);
    let report = checker.check(&mut po);
    assert_eq!(report.missing_ranges, vec!["x : nat".to_string()]);
    match &report.outcome {
        CheckOutcome::Error { message } => assert!(message.contains("x : nat"), "{message}"),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn batch_continues_past_failures() {
    init_logs();
    let checker = Checker::new(CheckerConfig::default(), nat_ranges());
    let mut pos = vec![
        forall_nat(1, |x| x >= 0),
        forall_nat(2, |x| x < 2),
        ProofObligation::new(
            3,
            "map compatible",
            QuantifiedExpr::forall(
                vec![Binding::typed(vec![Pattern::ident("x")], "bool")],
                x_satisfies(|_| true),
            ),
        ),
        forall_nat(4, |x| x != 1).unchecked(),
    ];
    let summary = checker.check_all(&mut pos);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.unchecked, 1);
    assert!(!summary.all_passed());
    let numbers: Vec<usize> = summary.reports.iter().map(|r| r.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

#[test]
fn parallel_batch_matches_sequential() {
    init_logs();
    let config = CheckerConfig {
        parallel: true,
        ..CheckerConfig::default()
    };
    let checker = Checker::new(config, nat_ranges());
    let mut pos: Vec<_> = (1..=8)
        .map(|n| {
            if n % 2 == 0 {
                forall_nat(n, |x| x < 2)
            } else {
                forall_nat(n, |x| x >= 0)
            }
        })
        .collect();
    let summary = checker.check_all(&mut pos);
    assert_eq!(summary.passed, 4);
    assert_eq!(summary.failed, 4);
    for r in &summary.reports {
        if r.number % 2 == 0 {
            assert!(r.to_string().ends_with("Counterexample: x = 2"));
        }
    }
    let numbers: Vec<usize> = summary.reports.iter().map(|r| r.number).collect();
    assert_eq!(numbers, (1..=8).collect::<Vec<_>>());
}

#[test]
fn terminate_request_is_reported_as_interrupted() {
    init_logs();
    let (interrupter, handle) = Interrupter::new();
    handle.terminate();
    let checker =
        Checker::new(CheckerConfig::default(), nat_ranges()).with_interrupter(interrupter);
    let mut po = forall_nat(1, |x| x >= 0);
    let report = checker.check(&mut po);
    assert_eq!(report.outcome, CheckOutcome::Interrupted);
    assert!(po.bindings()[0].overridden().is_none());
}

#[test]
fn globals_are_visible_to_predicates() {
    init_logs();
    let checker = Checker::new(CheckerConfig::default(), nat_ranges())
        .with_globals(Frame::from_iter([("max", Value::Int(3))]));
    let bounded: BoxedPredicate = Box::new(from_fn(|env: &Context<'_>, _: &mut EvalCx<'_>| {
        Ok(Value::Bool(int_of(env, "x")? <= int_of(env, "max")?))
    }));
    let mut po = ProofObligation::new(
        1,
        "state invariant",
        QuantifiedExpr::forall(vec![Binding::typed(vec![Pattern::ident("x")], "nat")], bounded),
    );
    assert!(checker.check(&mut po).outcome.is_passed());
}

#[test]
fn unknown_obligation_numbers_are_rejected() {
    init_logs();
    let checker = Checker::new(CheckerConfig::default(), nat_ranges());
    let mut pos = vec![forall_nat(1, |x| x >= 0), forall_nat(2, |x| x < 2)];

    let summary = checker.check_selected(&mut pos, &[2]).expect("known");
    assert_eq!(summary.total, 1);
    assert_eq!(summary.failed, 1);

    let err = checker.check_selected(&mut pos, &[1, 7]).expect_err("unknown");
    assert!(matches!(err, CheckError::UnknownObligation { number: 7, total: 2 }));
}

#[test]
fn default_ranges_cover_type_binds_once() {
    init_logs();
    let pos = vec![
        forall_nat(1, |x| x >= 0),
        forall_nat(2, |x| x < 2),
        ProofObligation::new(
            3,
            "subtype",
            QuantifiedExpr::forall(
                vec![Binding::typed(vec![Pattern::ident("a")], "Account")],
                x_satisfies(|_| true),
            ),
        ),
    ];
    let (table, skipped) = DefaultRanges::default().create(&pos, |name| match name {
        "nat" => Some(TypeDesc::Nat),
        _ => None,
    });
    assert_eq!(table.len(), 1);
    assert_eq!(table.get("x : nat").map(|s| s.len()), Some(4));
    assert_eq!(skipped, vec!["a : Account".to_string()]);
}

/// forall x : nat & exists y : nat & y >= x
fn nested_nat_obligation(number: usize) -> ProofObligation<BoxedPredicate> {
    let bound_above: BoxedPredicate = Box::new(QuantifiedExpr::exists(
        vec![Binding::typed(vec![Pattern::ident("y")], "nat")],
        from_fn(|env: &Context<'_>, _: &mut EvalCx<'_>| {
            Ok(Value::Bool(int_of(env, "y")? >= int_of(env, "x")?))
        }),
    ));
    ProofObligation::new(
        number,
        "satisfiability",
        QuantifiedExpr::forall(vec![Binding::typed(vec![Pattern::ident("x")], "nat")], bound_above),
    )
}

#[test]
fn nested_type_binds_take_ranges() {
    init_logs();
    let mut ranges = nat_ranges();
    let nats = DefaultRanges::default()
        .range_for(&TypeDesc::Nat)
        .expect("nat range");
    ranges.insert_set("y : nat", nats);
    let checker = Checker::new(CheckerConfig::default(), ranges);

    let mut po = nested_nat_obligation(1);
    let texts: Vec<String> = po.bindings().iter().map(|b| b.to_string()).collect();
    assert_eq!(texts, vec!["x : nat", "y : nat"]);

    let report = checker.check(&mut po);
    assert_eq!(report.outcome, CheckOutcome::Passed, "{report}");
    assert!(report.missing_ranges.is_empty());
    assert!(po.bindings().iter().all(|b| b.overridden().is_none()));
}

#[test]
fn default_ranges_reach_nested_binds() {
    init_logs();
    let pos = vec![nested_nat_obligation(1)];
    let (table, skipped) = DefaultRanges::default().create(&pos, |name| match name {
        "nat" => Some(TypeDesc::Nat),
        _ => None,
    });
    assert!(skipped.is_empty());
    assert!(table.contains("x : nat"));
    assert!(table.contains("y : nat"));
}

#[test]
fn existential_failure_has_no_counterexample() {
    init_logs();
    let checker = Checker::new(CheckerConfig::default(), nat_ranges());
    let mut po = ProofObligation::new(
        6,
        "satisfiability",
        QuantifiedExpr::exists(
            vec![Binding::typed(vec![Pattern::ident("x")], "nat")],
            x_satisfies(|x| x > 10),
        ),
    );
    let report = checker.check(&mut po);
    assert_eq!(report.outcome, CheckOutcome::Failed { counterexample: vec![] });
    let text = report.to_string();
    assert!(text.starts_with("PO# 6, FAILED in "), "{text}");
    assert!(!text.contains("Counterexample"), "{text}");
}

#[test]
fn summary_serializes_to_json() {
    init_logs();
    let checker = Checker::new(CheckerConfig::default(), nat_ranges());
    let mut pos = vec![forall_nat(1, |x| x < 1)];
    let summary = checker.check_all(&mut pos);
    let json: serde_json::Value =
        serde_json::from_str(&summary.to_json().expect("json")).expect("parse");
    assert_eq!(json["failed"], 1);
    assert_eq!(json["reports"][0]["status"], "failed");
    assert_eq!(json["reports"][0]["counterexample"][0]["name"], "x");
    assert_eq!(json["reports"][0]["counterexample"][0]["value"], "1");
}
