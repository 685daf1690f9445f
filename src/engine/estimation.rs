use crate::error::AppError;
use crate::geo;
use crate::models::pricing::{Carrier, CostBreakdown, CostEstimation, Tariff};
use crate::models::request::GeoPoint;

/// Prices a delivery between two points for one carrier. Pure: nothing is
/// committed anywhere, the caller freezes the outputs onto the request it
/// creates.
pub fn estimate(
    carrier: &Carrier,
    pickup: &GeoPoint,
    dropoff: &GeoPoint,
) -> Result<CostEstimation, AppError> {
    if !geo::in_bounds(pickup) {
        return Err(AppError::InvalidCoordinates(format!(
            "pickup ({}, {})",
            pickup.lat, pickup.lng
        )));
    }
    if !geo::in_bounds(dropoff) {
        return Err(AppError::InvalidCoordinates(format!(
            "delivery ({}, {})",
            dropoff.lat, dropoff.lng
        )));
    }

    let distance_km = geo::haversine_km(pickup, dropoff);
    let tariff = select_tariff(carrier, distance_km)?;

    let decimals = minor_unit_decimals(&carrier.currency);
    let distance_cost = round_to(tariff.price_per_km * distance_km, decimals);
    let total_cost = round_to(tariff.base_price + distance_cost, decimals);

    Ok(CostEstimation {
        distance_km,
        tariff_name: tariff.name.clone(),
        cost_breakdown: CostBreakdown {
            base_price: tariff.base_price,
            price_per_km: tariff.price_per_km,
            distance_cost,
        },
        total_cost,
        currency: carrier.currency.clone(),
    })
}

/// First tariff whose distance bracket contains the computed distance wins;
/// otherwise the carrier's default (or bracketless base) tariff.
fn select_tariff(carrier: &Carrier, distance_km: f64) -> Result<&Tariff, AppError> {
    carrier
        .tariffs
        .iter()
        .find(|t| t.covers(distance_km))
        .or_else(|| {
            carrier
                .tariffs
                .iter()
                .find(|t| t.is_default || (t.min_km.is_none() && t.max_km.is_none()))
        })
        .ok_or(AppError::NoApplicableTariff(carrier.id))
}

/// Minor-unit precision per ISO 4217; zero-decimal currencies round to
/// whole units.
fn minor_unit_decimals(currency: &str) -> u32 {
    match currency {
        "XAF" | "XOF" | "KMF" | "JPY" | "GNF" | "RWF" => 0,
        _ => 2,
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// The frozen decimal string copied onto a created request.
pub fn format_cost(estimation: &CostEstimation) -> String {
    let decimals = minor_unit_decimals(&estimation.currency) as usize;
    format!("{:.*}", decimals, estimation.total_cost)
}

pub fn distance_meters(distance_km: f64) -> u32 {
    (distance_km * 1000.0).round() as u32
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{distance_meters, estimate, format_cost};
    use crate::error::AppError;
    use crate::models::pricing::{Carrier, Tariff};
    use crate::models::request::GeoPoint;

    fn tariff(name: &str, base: f64, per_km: f64, bracket: Option<(f64, f64)>) -> Tariff {
        Tariff {
            name: name.to_string(),
            base_price: base,
            price_per_km: per_km,
            min_km: bracket.map(|(min, _)| min),
            max_km: bracket.map(|(_, max)| max),
            is_default: bracket.is_none(),
        }
    }

    fn carrier(currency: &str, tariffs: Vec<Tariff>) -> Carrier {
        Carrier {
            id: Uuid::new_v4(),
            name: "Rapido Express".to_string(),
            currency: currency.to_string(),
            tariffs,
        }
    }

    // Two points 3.2 km apart along a meridian (1 degree of latitude is
    // ~111.2 km, so 3.2 km is ~0.02878 degrees).
    fn points_3200_meters_apart() -> (GeoPoint, GeoPoint) {
        (
            GeoPoint {
                lat: 4.0000,
                lng: 9.7000,
            },
            GeoPoint {
                lat: 4.028779,
                lng: 9.7000,
            },
        )
    }

    #[test]
    fn zero_decimal_currency_rounds_distance_cost_to_integer() {
        let carrier = carrier("XAF", vec![tariff("standard", 500.0, 150.0, None)]);
        let (pickup, dropoff) = points_3200_meters_apart();

        let est = estimate(&carrier, &pickup, &dropoff).unwrap();

        assert!((est.distance_km - 3.2).abs() < 0.01);
        assert_eq!(est.cost_breakdown.distance_cost, 480.0);
        assert_eq!(est.total_cost, 980.0);
        assert_eq!(est.cost_breakdown.base_price, 500.0);
        assert_eq!(est.currency, "XAF");
        assert_eq!(format_cost(&est), "980");
    }

    #[test]
    fn total_is_base_plus_distance_cost() {
        let carrier = carrier("EUR", vec![tariff("eco", 2.5, 0.8, None)]);
        let pickup = GeoPoint {
            lat: 48.8566,
            lng: 2.3522,
        };
        let dropoff = GeoPoint {
            lat: 48.8606,
            lng: 2.3376,
        };

        let est = estimate(&carrier, &pickup, &dropoff).unwrap();

        let expected = est.cost_breakdown.base_price + est.cost_breakdown.distance_cost;
        assert!((est.total_cost - expected).abs() < 1e-9);
    }

    #[test]
    fn bracket_tariff_beats_default_when_distance_matches() {
        let carrier = carrier(
            "XAF",
            vec![
                tariff("base", 500.0, 150.0, None),
                tariff("court trajet", 300.0, 100.0, Some((0.0, 5.0))),
            ],
        );
        let (pickup, dropoff) = points_3200_meters_apart();

        let est = estimate(&carrier, &pickup, &dropoff).unwrap();

        assert_eq!(est.tariff_name, "court trajet");
        assert_eq!(est.cost_breakdown.base_price, 300.0);
    }

    #[test]
    fn falls_back_to_default_outside_every_bracket() {
        let carrier = carrier(
            "XAF",
            vec![
                tariff("court trajet", 300.0, 100.0, Some((0.0, 1.0))),
                tariff("base", 500.0, 150.0, None),
            ],
        );
        let (pickup, dropoff) = points_3200_meters_apart();

        let est = estimate(&carrier, &pickup, &dropoff).unwrap();
        assert_eq!(est.tariff_name, "base");
    }

    #[test]
    fn carrier_without_tariffs_has_no_applicable_tariff() {
        let carrier = carrier("XAF", vec![]);
        let (pickup, dropoff) = points_3200_meters_apart();

        let err = estimate(&carrier, &pickup, &dropoff).unwrap_err();
        assert!(matches!(err, AppError::NoApplicableTariff(_)));
    }

    #[test]
    fn invalid_coordinates_are_refused_before_any_pricing() {
        let carrier = carrier("XAF", vec![tariff("standard", 500.0, 150.0, None)]);
        let bad = GeoPoint {
            lat: 95.0,
            lng: 9.7,
        };
        let ok = GeoPoint {
            lat: 4.05,
            lng: 9.76,
        };

        assert!(matches!(
            estimate(&carrier, &bad, &ok).unwrap_err(),
            AppError::InvalidCoordinates(_)
        ));
        assert!(matches!(
            estimate(&carrier, &ok, &bad).unwrap_err(),
            AppError::InvalidCoordinates(_)
        ));
    }

    #[test]
    fn two_decimal_currency_formats_cents() {
        let carrier = carrier("EUR", vec![tariff("eco", 2.5, 0.8, None)]);
        let pickup = GeoPoint {
            lat: 48.8566,
            lng: 2.3522,
        };
        let est = estimate(&carrier, &pickup, &pickup).unwrap();

        // Zero distance: total is the base price alone.
        assert_eq!(est.cost_breakdown.distance_cost, 0.0);
        assert_eq!(format_cost(&est), "2.50");
    }

    #[test]
    fn distance_meters_rounds_to_nearest_meter() {
        assert_eq!(distance_meters(3.2), 3200);
        assert_eq!(distance_meters(0.0004), 0);
        assert_eq!(distance_meters(0.0006), 1);
    }
}
