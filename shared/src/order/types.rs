//! Order value types shared by commands, events and snapshots

use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment method chosen at checkout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery - the rider collects cash at the door
    Cod,
    Card,
    Wallet,
}

impl PaymentMethod {
    pub fn is_cod(&self) -> bool {
        matches!(self, PaymentMethod::Cod)
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

/// Role of the acting user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Customer,
    Restaurant,
    Rider,
    Admin,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Customer => "customer",
            ActorRole::Restaurant => "restaurant",
            ActorRole::Rider => "rider",
            ActorRole::Admin => "admin",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(ActorRole::Customer),
            "restaurant" => Ok(ActorRole::Restaurant),
            "rider" => Ok(ActorRole::Rider),
            "admin" => Ok(ActorRole::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Acting identity attached to every command
///
/// `restaurant_id` is set for restaurant accounts, `rider_id` for users
/// holding a rider profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub name: String,
    pub role: ActorRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rider_id: Option<String>,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }
}

/// Geographic coordinate pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Priced add-on selected for a dish
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddOn {
    pub name: String,
    pub price: f64,
}

/// Item as submitted at checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub dish_id: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default)]
    pub add_ons: Vec<AddOn>,
}

/// Item snapshot stored with the order (dish data frozen at checkout)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub dish_id: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default)]
    pub add_ons: Vec<AddOn>,
    /// quantity × (unit_price + Σ add-on price)
    pub line_total: f64,
}

/// Delivery data captured at checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryInfo {
    pub shipping_address: String,
    pub location: GeoPoint,
    /// Restaurant coordinates at checkout, used for rider distance filtering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default)]
    pub cutlery: bool,
}

/// Computed order financials
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderPricing {
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub tax: f64,
    pub service_fee: f64,
    pub discount: f64,
    pub total: f64,
    /// Gross rider earning used when no distance is reported at delivery
    pub rider_earning: f64,
}

/// Checkout submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderInput {
    pub restaurant_id: String,
    /// Only honoured for admin actors; customers always order for themselves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub delivery_fee: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub service_fee: f64,
    #[serde(default)]
    pub discount: f64,
    /// Defaults to the delivery fee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rider_earning: Option<f64>,
    pub payment_method: PaymentMethod,
    pub delivery: DeliveryInfo,
}

/// Money movements computed when an order is delivered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySettlement {
    pub rider_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub gross_earning: f64,
    pub rider_commission: f64,
    pub net_earning: f64,
    /// Cash collected by the rider (COD only, else 0)
    pub cod_collected: f64,
    /// Commission retained by the platform from COD cash
    pub platform_commission: f64,
    /// Amount credited to the restaurant (COD only, else 0)
    pub restaurant_credit: f64,
}

/// Command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Order affected by the command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, order_id: Option<String>) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            order_id: None,
            error: Some(error),
        }
    }

    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            order_id: None,
            error: None,
        }
    }
}

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    OrderNotFound,
    RiderNotFound,
    InvalidTransition,
    PermissionDenied,
    OrderAlreadyAssigned,
    OrderTerminal,
    RiderBusy,
    RiderOffline,
    RiderNotVerified,
    ValidationFailed,
    RefundNotAllowed,
    PaymentAlreadyRefunded,
    InvalidOperation,
    DuplicateCommand,
    InternalError,
    // Storage errors (maps to ErrorCode 94xx)
    StorageFull,
    OutOfMemory,
    StorageCorrupted,
    SystemBusy,
}

impl From<CommandErrorCode> for ErrorCode {
    fn from(code: CommandErrorCode) -> Self {
        match code {
            CommandErrorCode::OrderNotFound => ErrorCode::OrderNotFound,
            CommandErrorCode::RiderNotFound => ErrorCode::RiderNotFound,
            CommandErrorCode::InvalidTransition => ErrorCode::InvalidTransition,
            CommandErrorCode::PermissionDenied => ErrorCode::PermissionDenied,
            CommandErrorCode::OrderAlreadyAssigned => ErrorCode::OrderAlreadyAssigned,
            CommandErrorCode::OrderTerminal => ErrorCode::OrderTerminal,
            CommandErrorCode::RiderBusy => ErrorCode::RiderBusy,
            CommandErrorCode::RiderOffline => ErrorCode::RiderOffline,
            CommandErrorCode::RiderNotVerified => ErrorCode::RiderNotVerified,
            CommandErrorCode::ValidationFailed => ErrorCode::ValidationFailed,
            CommandErrorCode::RefundNotAllowed => ErrorCode::RefundNotAllowed,
            CommandErrorCode::PaymentAlreadyRefunded => ErrorCode::PaymentAlreadyRefunded,
            CommandErrorCode::InvalidOperation => ErrorCode::InvalidRequest,
            CommandErrorCode::DuplicateCommand => ErrorCode::AlreadyExists,
            CommandErrorCode::InternalError => ErrorCode::InternalError,
            CommandErrorCode::StorageFull => ErrorCode::StorageFull,
            CommandErrorCode::OutOfMemory => ErrorCode::OutOfMemory,
            CommandErrorCode::StorageCorrupted => ErrorCode::StorageCorrupted,
            CommandErrorCode::SystemBusy => ErrorCode::SystemBusy,
        }
    }
}

impl From<CommandError> for crate::error::AppError {
    fn from(err: CommandError) -> Self {
        crate::error::AppError::with_message(err.code.into(), err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Cod).unwrap(),
            "\"cod\""
        );
        let method: PaymentMethod = serde_json::from_str("\"wallet\"").unwrap();
        assert_eq!(method, PaymentMethod::Wallet);
    }

    #[test]
    fn test_actor_role_parse() {
        assert_eq!("rider".parse::<ActorRole>(), Ok(ActorRole::Rider));
        assert!("driver".parse::<ActorRole>().is_err());
        assert_eq!(ActorRole::Restaurant.to_string(), "restaurant");
    }

    #[test]
    fn test_command_error_maps_to_http_codes() {
        let err: crate::error::AppError =
            CommandError::new(CommandErrorCode::OrderAlreadyAssigned, "taken").into();
        assert_eq!(err.code, ErrorCode::OrderAlreadyAssigned);
        assert_eq!(err.http_status(), http::StatusCode::CONFLICT);

        let code: ErrorCode = CommandErrorCode::InvalidTransition.into();
        assert_eq!(code.http_status(), http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_place_order_input_camel_case() {
        let json = r#"{
            "restaurantId": "rest-1",
            "items": [{"dishId": "d1", "name": "Biryani", "quantity": 2, "unitPrice": 450.0,
                       "addOns": [{"name": "Raita", "price": 50.0}]}],
            "deliveryFee": 100.0,
            "paymentMethod": "cod",
            "delivery": {"shippingAddress": "Street 1", "location": {"lat": 24.8, "lng": 67.0}}
        }"#;
        let input: PlaceOrderInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.items[0].add_ons.len(), 1);
        assert_eq!(input.delivery_fee, 100.0);
        assert_eq!(input.tax, 0.0);
        assert!(!input.delivery.cutlery);
    }
}
