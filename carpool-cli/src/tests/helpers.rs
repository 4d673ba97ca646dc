//! Test helpers for writing trip fixtures and injecting providers.

use std::cell::{Cell, RefCell};
use std::fs;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use carpool_core::test_support::{FailOnOrigin, HaversineTravelTimeProvider};
use carpool_core::{Passenger, RiderSegment, TravelTimeError, TravelTimeProvider, Trip};
use geo::{Coord, LineString};
use tempfile::TempDir;

use crate::CliError;
use crate::provider::ProviderBuilder;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write fixture");
}

/// Temporary directory holding fixture files for one test.
pub(super) struct Workspace {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        Self { _tmp: tmp, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write_json<T: serde::Serialize>(&self, name: &str, value: &T) -> Utf8PathBuf {
        let path = self.path(name);
        let payload = serde_json::to_vec_pretty(value).expect("serialize fixture");
        write_utf8(&path, &payload);
        path
    }
}

fn coord(x: f64, y: f64) -> Coord<f64> {
    Coord { x, y }
}

/// Northbound along the prime meridian, one hour at the haversine speed.
pub(super) fn north_trip() -> Trip {
    Trip::new(
        "north",
        coord(0.0, 0.0),
        coord(0.0, 1.0),
        Duration::from_secs(3600),
        10,
    )
    .with_seats(2)
    .with_route(LineString::from(vec![(0.0, 0.0), (0.0, 0.5), (0.0, 1.0)]))
}

/// Same corridor as [`north_trip`] but driving south.
pub(super) fn south_trip() -> Trip {
    Trip::new(
        "south",
        coord(0.0, 1.0),
        coord(0.0, 0.0),
        Duration::from_secs(3600),
        10,
    )
    .with_route(LineString::from(vec![(0.0, 1.0), (0.0, 0.0)]))
}

/// Far away from the rider; removed by the bounding box.
pub(super) fn east_trip() -> Trip {
    Trip::new(
        "east",
        coord(5.0, 0.0),
        coord(6.0, 0.0),
        Duration::from_secs(3600),
        10,
    )
}

/// Northbound trip whose only seat is taken.
pub(super) fn full_trip() -> Trip {
    Trip::new(
        "full",
        coord(0.0, 0.0),
        coord(0.0, 1.0),
        Duration::from_secs(3600),
        10,
    )
    .with_seats(0)
}

pub(super) fn sample_trips() -> Vec<Trip> {
    vec![north_trip(), south_trip(), east_trip(), full_trip()]
}

/// [`north_trip`] with two riders travelling up the meridian.
pub(super) fn trip_with_passengers() -> Trip {
    let rider = |id: &str, from: f64, to: f64| {
        Passenger::new(id, RiderSegment::single(coord(0.0, from), coord(0.0, to)))
    };
    north_trip()
        .with_passenger(rider("ana", 0.2, 0.6))
        .with_passenger(rider("ben", 0.4, 0.8))
}

pub(super) const RIDER_ORIGIN: &str = "0,0.5";
pub(super) const RIDER_DESTINATION: &str = "0,0.6";

/// Hands out haversine providers and records the requested base URLs.
#[derive(Debug, Default)]
pub(super) struct HaversineBuilder {
    builds: Cell<usize>,
    last_url: RefCell<Option<String>>,
}

impl HaversineBuilder {
    pub(super) fn builds(&self) -> usize {
        self.builds.get()
    }

    pub(super) fn last_url(&self) -> Option<String> {
        self.last_url.borrow().clone()
    }
}

impl ProviderBuilder for HaversineBuilder {
    fn build(&self, base_url: &str) -> Result<Box<dyn TravelTimeProvider>, CliError> {
        self.builds.set(self.builds.get() + 1);
        self.last_url.replace(Some(base_url.to_owned()));
        Ok(Box::new(HaversineTravelTimeProvider::default()))
    }
}

/// Fails every lookup for trips starting at `origin`.
pub(super) struct FailingOriginBuilder {
    pub(super) origin: Coord<f64>,
}

impl ProviderBuilder for FailingOriginBuilder {
    fn build(&self, _base_url: &str) -> Result<Box<dyn TravelTimeProvider>, CliError> {
        Ok(Box::new(FailOnOrigin {
            inner: HaversineTravelTimeProvider::default(),
            origin: self.origin,
            error: TravelTimeError::Timeout {
                url: "http://localhost:5000/table/v1/driving".to_owned(),
                timeout_secs: 30,
            },
        }))
    }
}
