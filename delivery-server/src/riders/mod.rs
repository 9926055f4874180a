//! Rider registry
//!
//! Profile lifecycle (register → admin verification → online) and location
//! updates. Assignment itself is an order command; this service only offers
//! the available-order view the assignment starts from.

use std::sync::Arc;

use serde_json::json;
use shared::RelayMessage;
use shared::message::{events, order_channel, rider_channel};
use shared::models::{BankDetails, Rider, RiderCreate, VerificationStatus};
use shared::order::GeoPoint;
use shared::util::{new_id, now_millis};

use crate::message::MessageBus;
use crate::orders::{AvailableOrder, OrdersManager, StorageError, dispatch};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_coordinates, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

fn rider_not_found(rider_id: &str) -> AppError {
    AppError::with_message(ErrorCode::RiderNotFound, format!("Rider not found: {rider_id}"))
}

fn validate_bank_details(bank: &BankDetails) -> AppResult<()> {
    validate_required_text(&bank.account_title, "accountTitle", MAX_NAME_LEN)?;
    validate_required_text(&bank.account_number, "accountNumber", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&bank.bank_name, "bankName", MAX_NAME_LEN)?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct RiderService {
    orders: Arc<OrdersManager>,
    bus: MessageBus,
    /// Default available-order radius (km)
    radius_km: f64,
}

impl RiderService {
    pub fn new(orders: Arc<OrdersManager>, bus: MessageBus, radius_km: f64) -> Self {
        Self {
            orders,
            bus,
            radius_km,
        }
    }

    /// Rider profile id linked to a user account
    pub fn resolve_rider_id(&self, user_id: &str) -> AppResult<Option<String>> {
        Ok(self.orders.storage().find_rider_id_by_user(user_id)?)
    }

    /// Create the profile of a rider account; verification starts `pending`
    pub fn register(&self, user_id: &str, name: &str, input: RiderCreate) -> AppResult<Rider> {
        if let Some(bank) = &input.bank_details {
            validate_bank_details(bank)?;
        }

        let storage = self.orders.storage();
        let txn = storage.begin_write()?;
        if let Some(existing) = storage.find_rider_id_by_user_txn(&txn, user_id)? {
            return Err(AppError::with_message(
                ErrorCode::RiderAlreadyRegistered,
                format!("User {user_id} already has rider profile {existing}"),
            ));
        }

        let mut rider = Rider::new(new_id(), user_id.to_string(), name.to_string(), now_millis());
        rider.verification = VerificationStatus::Pending;
        rider.bank_details = input.bank_details;
        storage.store_rider(&txn, &rider)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(rider_id = %rider.id, user_id = %user_id, "Rider registered");
        Ok(rider)
    }

    pub fn get(&self, rider_id: &str) -> AppResult<Rider> {
        self.orders
            .storage()
            .get_rider(rider_id)?
            .ok_or_else(|| rider_not_found(rider_id))
    }

    pub fn set_verification(&self, rider_id: &str, status: VerificationStatus) -> AppResult<Rider> {
        let rider = self.update(rider_id, |rider| {
            rider.verification = status;
            if status != VerificationStatus::Approved {
                rider.online = false;
            }
            Ok(())
        })?;
        tracing::info!(rider_id = %rider_id, status = ?status, "Rider verification updated");
        Ok(rider)
    }

    /// Only approved riders can go online
    pub fn set_online(&self, rider_id: &str, online: bool) -> AppResult<Rider> {
        let rider = self.update(rider_id, |rider| {
            if online && !rider.is_approved() {
                return Err(AppError::with_message(
                    ErrorCode::RiderNotVerified,
                    format!("Rider {} is not approved", rider.id),
                ));
            }
            rider.online = online;
            Ok(())
        })?;
        tracing::info!(rider_id = %rider_id, online, "Rider availability changed");
        Ok(rider)
    }

    /// Store the last known position and push it to the rider's active order
    pub fn update_location(&self, rider_id: &str, location: GeoPoint) -> AppResult<Rider> {
        validate_coordinates(location.lat, location.lng)?;
        let rider = self.update(rider_id, |rider| {
            rider.location = Some(location);
            rider.location_updated_at = Some(rider.updated_at);
            Ok(())
        })?;

        let payload = json!({
            "riderId": rider.id,
            "orderId": rider.current_order,
            "lat": location.lat,
            "lng": location.lng,
        });
        let mut channels = vec![rider_channel(&rider.id)];
        if let Some(order_id) = &rider.current_order {
            channels.push(order_channel(order_id));
        }
        self.bus.publish_all(
            channels
                .into_iter()
                .map(|channel| RelayMessage::new(channel, events::RIDER_LOCATION_UPDATE, payload.clone())),
        );
        Ok(rider)
    }

    /// Orders the rider may accept, nearest first
    pub fn available_orders(
        &self,
        rider_id: &str,
        radius_km: Option<f64>,
    ) -> AppResult<Vec<AvailableOrder>> {
        let radius = radius_km.unwrap_or(self.radius_km);
        if !radius.is_finite() || radius < 0.0 {
            return Err(AppError::validation(format!("radiusKm must be non-negative, got {radius}")));
        }
        let rider = self.get(rider_id)?;
        let active = self.orders.get_active_orders()?;
        Ok(dispatch::available_orders(active, &rider, radius))
    }

    /// Read-modify-write one rider inside a single write transaction
    fn update<F>(&self, rider_id: &str, mutate: F) -> AppResult<Rider>
    where
        F: FnOnce(&mut Rider) -> AppResult<()>,
    {
        let storage = self.orders.storage();
        let txn = storage.begin_write()?;
        let mut rider = storage
            .get_rider_txn(&txn, rider_id)?
            .ok_or_else(|| rider_not_found(rider_id))?;
        rider.updated_at = now_millis();
        mutate(&mut rider)?;
        storage.store_rider(&txn, &rider)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(rider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FinanceConfig;
    use crate::orders::OrderStorage;

    fn service() -> RiderService {
        let storage = OrderStorage::open_in_memory().unwrap();
        let orders = Arc::new(OrdersManager::with_storage(storage, FinanceConfig::default()));
        RiderService::new(orders, MessageBus::new(16), 10.0)
    }

    #[test]
    fn test_register_once_per_user() {
        let service = service();
        let rider = service
            .register("user-1", "Bilal", RiderCreate::default())
            .unwrap();
        assert_eq!(rider.verification, VerificationStatus::Pending);
        assert!(!rider.online);
        assert_eq!(
            service.resolve_rider_id("user-1").unwrap().as_deref(),
            Some(rider.id.as_str())
        );

        let err = service
            .register("user-1", "Bilal", RiderCreate::default())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RiderAlreadyRegistered);
    }

    #[test]
    fn test_register_validates_bank_details() {
        let err = service()
            .register(
                "user-1",
                "Bilal",
                RiderCreate {
                    bank_details: Some(BankDetails {
                        account_title: "Bilal Khan".to_string(),
                        account_number: String::new(),
                        bank_name: "HBL".to_string(),
                    }),
                },
            )
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_online_requires_approval() {
        let service = service();
        let rider = service
            .register("user-1", "Bilal", RiderCreate::default())
            .unwrap();

        let err = service.set_online(&rider.id, true).unwrap_err();
        assert_eq!(err.code, ErrorCode::RiderNotVerified);

        service
            .set_verification(&rider.id, VerificationStatus::Approved)
            .unwrap();
        assert!(service.set_online(&rider.id, true).unwrap().online);

        // Rejection takes the rider offline
        let rejected = service
            .set_verification(&rider.id, VerificationStatus::Rejected)
            .unwrap();
        assert!(!rejected.online);
    }

    #[test]
    fn test_location_update_is_published() {
        let service = service();
        let rider = service
            .register("user-1", "Bilal", RiderCreate::default())
            .unwrap();
        let mut rx = service.bus.subscribe();

        let point = GeoPoint {
            lat: 24.86,
            lng: 67.01,
        };
        let updated = service.update_location(&rider.id, point).unwrap();
        assert_eq!(updated.location, Some(point));
        assert!(updated.location_updated_at.is_some());

        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.event, "riderLocationUpdate");
        assert_eq!(msg.channel, format!("rider-{}", rider.id));

        let bad = GeoPoint {
            lat: 91.0,
            lng: 0.0,
        };
        assert_eq!(
            service.update_location(&rider.id, bad).unwrap_err().code,
            ErrorCode::ValidationFailed
        );
    }

    #[test]
    fn test_unknown_rider() {
        let service = service();
        assert_eq!(service.get("ghost").unwrap_err().code, ErrorCode::RiderNotFound);
        assert_eq!(
            service.set_online("ghost", false).unwrap_err().code,
            ErrorCode::RiderNotFound
        );
        assert_eq!(
            service.available_orders("ghost", None).unwrap_err().code,
            ErrorCode::RiderNotFound
        );
    }

    #[test]
    fn test_negative_radius_rejected() {
        let service = service();
        let rider = service
            .register("user-1", "Bilal", RiderCreate::default())
            .unwrap();
        assert_eq!(
            service
                .available_orders(&rider.id, Some(-1.0))
                .unwrap_err()
                .code,
            ErrorCode::ValidationFailed
        );
        assert!(service.available_orders(&rider.id, None).unwrap().is_empty());
    }
}
