//! Focused unit tests covering the recompute command.

use super::helpers::{HaversineBuilder, Workspace, north_trip, trip_with_passengers};
use super::*;
use crate::provider::ProviderBuilder;
use crate::recompute::{
    RecomputeConfig, RecomputeReport, StopKind, StopReport, run_recompute_with,
};
use carpool_core::test_support::MatrixTravelTimeProvider;
use carpool_core::{TravelTimeError, TravelTimeProvider};
use rstest::rstest;

fn recompute_args(trip: camino::Utf8PathBuf) -> RecomputeArgs {
    RecomputeArgs {
        trip: Some(trip),
        osrm_base_url: None,
    }
}

fn stop(kind: StopKind, rider_id: Option<&str>) -> StopReport {
    StopReport {
        kind,
        rider_id: rider_id.map(str::to_owned),
    }
}

struct NoRouteBuilder;

impl ProviderBuilder for NoRouteBuilder {
    fn build(&self, _base_url: &str) -> Result<Box<dyn TravelTimeProvider>, CliError> {
        Ok(Box::new(MatrixTravelTimeProvider::failing(
            TravelTimeError::NoRoute,
        )))
    }
}

#[rstest]
fn converting_without_trip_errors() {
    let err = RecomputeConfig::try_from(RecomputeArgs::default())
        .expect_err("missing trip should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_TRIP);
            assert_eq!(env, ENV_RECOMPUTE_TRIP);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn recompute_plans_passengers_in_path_order() {
    let workspace = Workspace::new();
    let trip = workspace.write_json("trip.json", &trip_with_passengers());
    let builder = HaversineBuilder::default();
    let mut stdout = Vec::new();

    run_recompute_with(recompute_args(trip), &builder, &mut stdout)
        .expect("recompute should succeed");

    let report: RecomputeReport = serde_json::from_slice(&stdout).expect("JSON report");
    assert_eq!(report.trip_id, "north");
    assert!((report.duration_secs - 3600.0).abs() < 1e-3);
    assert_eq!(
        report.stops,
        vec![
            stop(StopKind::Origin, None),
            stop(StopKind::Pickup, Some("ana")),
            stop(StopKind::Pickup, Some("ben")),
            stop(StopKind::Dropoff, Some("ana")),
            stop(StopKind::Dropoff, Some("ben")),
            stop(StopKind::Destination, None),
        ]
    );
    assert_eq!(builder.builds(), 1);
}

#[rstest]
fn trip_without_passengers_reports_base_duration_offline() {
    let workspace = Workspace::new();
    let trip = workspace.write_json("trip.json", &north_trip());
    let mut stdout = Vec::new();

    // Every lookup would fail, so success means none was made.
    run_recompute_with(recompute_args(trip), &NoRouteBuilder, &mut stdout)
        .expect("recompute should succeed");

    let report: RecomputeReport = serde_json::from_slice(&stdout).expect("JSON report");
    assert!((report.duration_secs - 3600.0).abs() < f64::EPSILON);
    assert_eq!(
        report.stops,
        vec![stop(StopKind::Origin, None), stop(StopKind::Destination, None)]
    );
}

#[rstest]
fn zero_seat_passenger_is_rejected_on_load() {
    let workspace = Workspace::new();
    let mut json = serde_json::to_value(trip_with_passengers()).expect("serialise trip");
    json["passengers"][0]["seats"] = serde_json::json!(0);
    let trip = workspace.write_json("trip.json", &json);
    let builder = HaversineBuilder::default();
    let mut stdout = Vec::new();

    let err = run_recompute_with(recompute_args(trip.clone()), &builder, &mut stdout)
        .expect_err("zero seats should be rejected");
    match err {
        CliError::ParseInput { path, .. } => assert_eq!(path, trip),
        other => panic!("expected ParseInput, found {other:?}"),
    }
    assert_eq!(builder.builds(), 0);
    assert!(stdout.is_empty());
}

#[rstest]
fn routing_failure_names_the_trip() {
    let workspace = Workspace::new();
    let trip = workspace.write_json("trip.json", &trip_with_passengers());
    let mut stdout = Vec::new();

    let err = run_recompute_with(recompute_args(trip), &NoRouteBuilder, &mut stdout)
        .expect_err("routing failure should error");
    match err {
        CliError::Recompute { trip_id, source } => {
            assert_eq!(trip_id, "north");
            assert_eq!(
                source,
                carpool_core::DetourError::TravelTime(TravelTimeError::NoRoute)
            );
        }
        other => panic!("expected Recompute, found {other:?}"),
    }
    assert!(stdout.is_empty());
}

#[rstest]
fn stop_reports_serialise_without_empty_rider() {
    let json = serde_json::to_value(vec![
        stop(StopKind::Origin, None),
        stop(StopKind::Pickup, Some("ana")),
    ])
    .expect("serialise stops");
    assert_eq!(
        json,
        serde_json::json!([
            { "kind": "origin" },
            { "kind": "pickup", "rider_id": "ana" },
        ])
    );
}
