use super::*;
use crate::orders::storage::OrderStorage;
use shared::models::{EntityType, Rider, VerificationStatus};
use shared::order::types::CommandErrorCode;
use shared::order::{
    Actor, ActorRole, AddOn, DeliveryInfo, GeoPoint, OrderCommandPayload, OrderItemInput,
    OrderStatus, PaymentMethod, PlaceOrderInput,
};


fn create_test_manager() -> OrdersManager {
    let storage = OrderStorage::open_in_memory().unwrap();
    OrdersManager::with_storage(storage, FinanceConfig::default())
}

// ========================================================================
// Actors
// ========================================================================

fn customer() -> Actor {
    Actor {
        user_id: "cust-1".to_string(),
        name: "Ayesha".to_string(),
        role: ActorRole::Customer,
        restaurant_id: None,
        rider_id: None,
    }
}

fn restaurant() -> Actor {
    Actor {
        user_id: "rest-user-1".to_string(),
        name: "Karachi Grill".to_string(),
        role: ActorRole::Restaurant,
        restaurant_id: Some("rest-1".to_string()),
        rider_id: None,
    }
}

fn rider(rider_id: &str) -> Actor {
    Actor {
        user_id: format!("user-{}", rider_id),
        name: format!("Rider {}", rider_id),
        role: ActorRole::Rider,
        restaurant_id: None,
        rider_id: Some(rider_id.to_string()),
    }
}

fn admin() -> Actor {
    Actor {
        user_id: "admin-1".to_string(),
        name: "Admin".to_string(),
        role: ActorRole::Admin,
        restaurant_id: None,
        rider_id: None,
    }
}

// ========================================================================
// Fixtures
// ========================================================================

/// Approved, online rider stored straight into the registry
fn seed_rider(manager: &OrdersManager, rider_id: &str) {
    let mut r = Rider::new(
        rider_id.to_string(),
        format!("user-{}", rider_id),
        format!("Rider {}", rider_id),
        0,
    );
    r.verification = VerificationStatus::Approved;
    r.online = true;
    let txn = manager.storage().begin_write().unwrap();
    manager.storage().store_rider(&txn, &r).unwrap();
    txn.commit().unwrap();
}

fn load_rider(manager: &OrdersManager, rider_id: &str) -> Rider {
    manager.storage().get_rider(rider_id).unwrap().unwrap()
}

/// 2 × (450 + 50) = 1000 subtotal; +100 delivery +80 tax −150 discount = 1030
fn checkout(payment_method: PaymentMethod) -> PlaceOrderInput {
    PlaceOrderInput {
        restaurant_id: "rest-1".to_string(),
        customer_id: None,
        items: vec![OrderItemInput {
            dish_id: "dish-biryani".to_string(),
            name: "Chicken Biryani".to_string(),
            quantity: 2,
            unit_price: 450.0,
            variant: Some("Full".to_string()),
            add_ons: vec![AddOn {
                name: "Raita".to_string(),
                price: 50.0,
            }],
        }],
        delivery_fee: 100.0,
        tax: 80.0,
        service_fee: 0.0,
        discount: 150.0,
        rider_earning: None,
        payment_method,
        delivery: DeliveryInfo {
            shipping_address: "House 12, Block 5, Clifton".to_string(),
            location: GeoPoint {
                lat: 24.8138,
                lng: 67.0300,
            },
            pickup_location: Some(GeoPoint {
                lat: 24.8270,
                lng: 67.0330,
            }),
            instructions: None,
            cutlery: true,
        },
    }
}

fn place_order(manager: &OrdersManager, payment_method: PaymentMethod) -> String {
    let resp = manager.execute_command(OrderCommand::new(
        customer(),
        OrderCommandPayload::PlaceOrder {
            input: checkout(payment_method),
        },
    ));
    assert!(resp.success, "PlaceOrder failed: {:?}", resp.error);
    resp.order_id.unwrap()
}

fn set_status(
    manager: &OrdersManager,
    actor: Actor,
    order_id: &str,
    status: OrderStatus,
) -> CommandResponse {
    manager.execute_command(OrderCommand::new(
        actor,
        OrderCommandPayload::UpdateStatus {
            order_id: order_id.to_string(),
            status,
            distance_km: None,
        },
    ))
}

fn accept(manager: &OrdersManager, rider_id: &str, order_id: &str) -> CommandResponse {
    manager.execute_command(OrderCommand::new(
        rider(rider_id),
        OrderCommandPayload::AcceptOrder {
            order_id: order_id.to_string(),
            rider_id: rider_id.to_string(),
        },
    ))
}

/// Walk an order from Pending to ArrivedAtCustomer with `rider_id` assigned
fn drive_to_customer(manager: &OrdersManager, order_id: &str, rider_id: &str) {
    assert!(set_status(manager, restaurant(), order_id, OrderStatus::Preparing).success);
    assert!(accept(manager, rider_id, order_id).success);
    assert!(set_status(manager, restaurant(), order_id, OrderStatus::Ready).success);
    for status in [
        OrderStatus::Arrived,
        OrderStatus::PickedUp,
        OrderStatus::OnTheWay,
        OrderStatus::ArrivedAtCustomer,
    ] {
        let resp = set_status(manager, rider(rider_id), order_id, status);
        assert!(resp.success, "{status} failed: {:?}", resp.error);
    }
}

fn error_code(resp: &CommandResponse) -> CommandErrorCode {
    resp.error.as_ref().map(|e| e.code).expect("expected an error")
}

fn ledger_len(manager: &OrdersManager, entity_type: EntityType, entity_id: &str) -> usize {
    manager
        .storage()
        .get_ledger_entries(entity_type, entity_id)
        .unwrap()
        .len()
}
