//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to `f64`
//! for storage/serialization.

use crate::core::config::FinanceConfig;
use crate::orders::traits::OrderError;
use rust_decimal::prelude::*;
use shared::order::types::CommandErrorCode;
use shared::order::{
    DeliverySettlement, OrderItem, OrderItemInput, OrderPricing, OrderSnapshot, PlaceOrderInput,
};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item or fee
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per item
const MAX_QUANTITY: i32 = 9999;
/// Longest delivery distance accepted for fare calculation
const MAX_DISTANCE_KM: f64 = 500.0;

fn validation(msg: String) -> OrderError {
    OrderError::InvalidOperation(CommandErrorCode::ValidationFailed, msg)
}

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), OrderError> {
    if !value.is_finite() {
        return Err(validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Finite, non-negative and within [`MAX_PRICE`]
fn require_amount(value: f64, field_name: &str) -> Result<(), OrderError> {
    require_finite(value, field_name)?;
    if value < 0.0 {
        return Err(validation(format!(
            "{} must be non-negative, got {}",
            field_name, value
        )));
    }
    if value > MAX_PRICE {
        return Err(validation(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field_name, MAX_PRICE, value
        )));
    }
    Ok(())
}

/// Validate an item submitted at checkout
pub fn validate_item(item: &OrderItemInput) -> Result<(), OrderError> {
    require_amount(item.unit_price, "unitPrice")?;
    for add_on in &item.add_ons {
        require_amount(add_on.price, "addOn.price")?;
    }

    if item.quantity <= 0 {
        return Err(validation(format!(
            "quantity must be positive, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, item.quantity
        )));
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// quantity × (unit price + Σ add-on price)
pub fn line_total(item: &OrderItemInput) -> Decimal {
    let add_ons: Decimal = item.add_ons.iter().map(|a| to_decimal(a.price)).sum();
    (to_decimal(item.unit_price) + add_ons) * Decimal::from(item.quantity)
}

/// Freeze items and compute the order financials for a checkout
///
/// `total = subtotal + deliveryFee + tax + serviceFee − discount`, with the
/// subtotal recomputed from the items.
pub fn compute_pricing(
    input: &PlaceOrderInput,
) -> Result<(Vec<OrderItem>, OrderPricing), OrderError> {
    if input.items.is_empty() {
        return Err(validation("order must contain at least one item".to_string()));
    }
    require_amount(input.delivery_fee, "deliveryFee")?;
    require_amount(input.tax, "tax")?;
    require_amount(input.service_fee, "serviceFee")?;
    require_amount(input.discount, "discount")?;
    if let Some(earning) = input.rider_earning {
        require_amount(earning, "riderEarning")?;
    }

    let mut subtotal = Decimal::ZERO;
    let mut items = Vec::with_capacity(input.items.len());
    for item in &input.items {
        validate_item(item)?;
        let total = line_total(item);
        subtotal += total;
        items.push(OrderItem {
            dish_id: item.dish_id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            variant: item.variant.clone(),
            add_ons: item.add_ons.clone(),
            line_total: to_f64(total),
        });
    }

    let total = subtotal + to_decimal(input.delivery_fee) + to_decimal(input.tax)
        + to_decimal(input.service_fee)
        - to_decimal(input.discount);
    if total < Decimal::ZERO {
        return Err(validation(format!(
            "discount {} exceeds order value",
            input.discount
        )));
    }

    let pricing = OrderPricing {
        subtotal: to_f64(subtotal),
        delivery_fee: input.delivery_fee,
        tax: input.tax,
        service_fee: input.service_fee,
        discount: input.discount,
        total: to_f64(total),
        rider_earning: input.rider_earning.unwrap_or(input.delivery_fee),
    };
    Ok((items, pricing))
}

/// Money movements for delivering `snapshot` with `rider_id`
///
/// Gross earning is `baseFare + perKm × distance` when a distance is reported,
/// else the rider earning stored at checkout.
pub fn settle_delivery(
    snapshot: &OrderSnapshot,
    rider_id: &str,
    distance_km: Option<f64>,
    finance: &FinanceConfig,
) -> Result<DeliverySettlement, OrderError> {
    let gross = match distance_km {
        Some(km) => {
            require_finite(km, "distanceKm")?;
            if !(0.0..=MAX_DISTANCE_KM).contains(&km) {
                return Err(validation(format!(
                    "distanceKm must be between 0 and {}, got {}",
                    MAX_DISTANCE_KM, km
                )));
            }
            to_decimal(finance.rider_base_fare) + to_decimal(finance.rider_per_km_rate) * to_decimal(km)
        }
        None => to_decimal(snapshot.rider_earning),
    };
    let gross = gross.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let rider_commission = gross * to_decimal(finance.rider_commission_rate);
    let net = gross - rider_commission;

    let (cod_collected, platform_commission, restaurant_credit) =
        if snapshot.payment_method.is_cod() {
            let total = to_decimal(snapshot.total);
            let commission = total * to_decimal(finance.platform_commission_rate);
            (total, commission, total - commission)
        } else {
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
        };

    Ok(DeliverySettlement {
        rider_id: rider_id.to_string(),
        distance_km,
        gross_earning: to_f64(gross),
        rider_commission: to_f64(rider_commission),
        net_earning: to_f64(net),
        cod_collected: to_f64(cod_collected),
        platform_commission: to_f64(platform_commission),
        restaurant_credit: to_f64(restaurant_credit),
    })
}
