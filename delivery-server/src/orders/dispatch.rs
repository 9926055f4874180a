//! Available-order listing for riders
//!
//! An order is offered to riders while it is non-terminal, has no rider and
//! has not passed the restaurant stages. Distance is measured from the
//! rider's last location to the pickup point (delivery location when the
//! order carries no pickup point).

use serde::Serialize;
use shared::models::Rider;
use shared::order::{GeoPoint, OrderSnapshot};

use super::transitions;

/// Mean Earth radius (km)
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Order offered to a rider, with its distance when known
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableOrder {
    #[serde(flatten)]
    pub order: OrderSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Great-circle distance between two points
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

pub fn is_available(order: &OrderSnapshot) -> bool {
    !order.is_terminal() && !order.has_rider() && transitions::is_dispatchable(order.status)
}

/// Filter `orders` down to what `rider` may accept within `radius_km`,
/// nearest first. A rider without a location sees every available order.
pub fn available_orders(
    orders: Vec<OrderSnapshot>,
    rider: &Rider,
    radius_km: f64,
) -> Vec<AvailableOrder> {
    let mut available: Vec<AvailableOrder> = orders
        .into_iter()
        .filter(is_available)
        .filter_map(|order| {
            let Some(origin) = rider.location else {
                return Some(AvailableOrder {
                    order,
                    distance_km: None,
                });
            };
            let pickup = order
                .delivery
                .pickup_location
                .unwrap_or(order.delivery.location);
            let distance = haversine_km(origin, pickup);
            (distance <= radius_km).then_some(AvailableOrder {
                order,
                distance_km: Some(distance),
            })
        })
        .collect();

    available.sort_by(|a, b| match (a.distance_km, b.distance_km) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.order.created_at.cmp(&b.order.created_at),
    });
    available
}
