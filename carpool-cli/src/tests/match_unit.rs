//! Focused unit tests covering the match command.

use super::helpers::{RIDER_DESTINATION, RIDER_ORIGIN, Workspace, sample_trips};
use super::*;
use crate::matching::{MatchConfig, MatchReport, TripVerdict, run_match_with};
use camino::Utf8PathBuf;
use carpool_core::RouteMatch;
use rstest::rstest;

fn match_args(trips: Utf8PathBuf) -> MatchArgs {
    MatchArgs {
        trips: Some(trips),
        origin: Some(RIDER_ORIGIN.to_owned()),
        destination: Some(RIDER_DESTINATION.to_owned()),
        threshold_km: None,
    }
}

#[rstest]
fn match_config_defaults_threshold() {
    let config = MatchConfig::try_from(match_args(Utf8PathBuf::from("trips.json")))
        .expect("config should build");
    assert!((config.threshold_km - 2.0).abs() < f64::EPSILON);
}

#[rstest]
fn missing_trips_names_the_match_env_var() {
    let args = MatchArgs {
        trips: None,
        ..match_args(Utf8PathBuf::from("trips.json"))
    };

    let err = MatchConfig::try_from(args).expect_err("missing trips should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_TRIPS);
            assert_eq!(env, ENV_MATCH_TRIPS);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case(0.0)]
#[case(-1.5)]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
fn match_config_rejects_unusable_thresholds(#[case] threshold: f64) {
    let args = MatchArgs {
        threshold_km: Some(threshold),
        ..match_args(Utf8PathBuf::from("trips.json"))
    };

    let err = MatchConfig::try_from(args).expect_err("threshold should be rejected");
    match err {
        CliError::InvalidThreshold { field, .. } => assert_eq!(field, ARG_THRESHOLD_KM),
        other => panic!("expected InvalidThreshold, found {other:?}"),
    }
}

#[rstest]
fn match_lists_verdicts_in_input_order() {
    let workspace = Workspace::new();
    let trips = workspace.write_json("trips.json", &sample_trips());
    let mut stdout = Vec::new();

    run_match_with(match_args(trips), &mut stdout).expect("match should succeed");

    let report: MatchReport = serde_json::from_slice(&stdout).expect("JSON report");
    assert_eq!(report.matched, vec!["north".to_owned()]);
    let verdict = |trip_id: &str, verdict| TripVerdict {
        trip_id: trip_id.to_owned(),
        verdict,
    };
    assert_eq!(
        report.verdicts,
        vec![
            verdict("north", RouteMatch::Matched),
            verdict("south", RouteMatch::WrongDirection),
            verdict("east", RouteMatch::LegacyTooFar),
            verdict("full", RouteMatch::LegacyTooFar),
        ]
    );
}

#[rstest]
fn wider_threshold_admits_legacy_trips() {
    let workspace = Workspace::new();
    let trips = workspace.write_json("trips.json", &sample_trips());
    let mut stdout = Vec::new();
    let args = MatchArgs {
        origin: Some("0,0.1".to_owned()),
        destination: Some("0,0.9".to_owned()),
        threshold_km: Some(12.0),
        ..match_args(trips)
    };

    run_match_with(args, &mut stdout).expect("match should succeed");

    let report: MatchReport = serde_json::from_slice(&stdout).expect("JSON report");
    assert_eq!(report.matched, vec!["north".to_owned(), "full".to_owned()]);
}

#[rstest]
fn help_describes_the_legacy_fallback() {
    use clap::CommandFactory;

    let help = MatchArgs::command()
        .get_long_about()
        .map(ToString::to_string)
        .unwrap_or_default();
    assert!(help.contains("endpoint proximity"), "{help}");
    assert!(!help.contains("bearing"), "legacy trips have no bearing check: {help}");
}
