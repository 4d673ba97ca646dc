//! Parsing of `LON,LAT` coordinate options.

use geo::Coord;

use crate::CliError;

/// Parse a `LON,LAT` pair in WGS-84 degrees.
pub(crate) fn parse_coord(field: &'static str, value: &str) -> Result<Coord<f64>, CliError> {
    let invalid = |reason| CliError::InvalidCoordinate {
        field,
        value: value.to_owned(),
        reason,
    };
    let (lon, lat) = value
        .split_once(',')
        .ok_or_else(|| invalid("expected LON,LAT"))?;
    let x: f64 = lon
        .trim()
        .parse()
        .map_err(|_| invalid("longitude is not a number"))?;
    let y: f64 = lat
        .trim()
        .parse()
        .map_err(|_| invalid("latitude is not a number"))?;
    if !(-180.0..=180.0).contains(&x) {
        return Err(invalid("longitude must lie within [-180, 180]"));
    }
    if !(-90.0..=90.0).contains(&y) {
        return Err(invalid("latitude must lie within [-90, 90]"));
    }
    Ok(Coord { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("-0.1276,51.5072", -0.1276, 51.5072)]
    #[case(" 13.4 , 52.52 ", 13.4, 52.52)]
    #[case("180,-90", 180.0, -90.0)]
    fn parses_lon_lat_pairs(#[case] input: &str, #[case] x: f64, #[case] y: f64) {
        let coord = parse_coord("origin", input).expect("valid coordinate");
        assert_eq!(coord, Coord { x, y });
    }

    #[rstest]
    #[case("51.5")]
    #[case("east,51.5")]
    #[case("0.1,north")]
    #[case("181,0")]
    #[case("0,91")]
    #[case("NaN,0")]
    fn rejects_malformed_pairs(#[case] input: &str) {
        let err = parse_coord("destination", input).expect_err("invalid coordinate");
        match err {
            CliError::InvalidCoordinate { field, value, .. } => {
                assert_eq!(field, "destination");
                assert_eq!(value, input);
            }
            other => panic!("expected InvalidCoordinate, found {other:?}"),
        }
    }
}
