//! Property-based tests for the entity cache
//!
//! Every entity type, with arbitrary optional fields and finite floats, must
//! come back from the SQLite store equal in every field.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rentsync::local_db::{EntityStore, LocalDatabase};
use rentsync::offline::ChangeQueue;
use rentsync::shared::entities::{PaymentStatus, RoomStatus};
use rentsync::shared::{
    ChangeOperation, Entity, NewChange, PaymentRecord, Property, Room, SyncStatus, Tenant,
};
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn key() -> impl Strategy<Value = String> {
    "[a-z0-9-]{1,16}"
}

fn text() -> impl Strategy<Value = String> {
    ".{0,24}"
}

fn finite_f64() -> impl Strategy<Value = f64> {
    prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO
}

fn timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_102_444_800, 0u32..1_000_000_000)
        .prop_map(|(secs, nanos)| Utc.timestamp_opt(secs, nanos).unwrap())
}

fn date() -> impl Strategy<Value = NaiveDate> {
    (1970i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn sync_status() -> impl Strategy<Value = SyncStatus> {
    prop_oneof![
        Just(SyncStatus::Synced),
        Just(SyncStatus::Pending),
        Just(SyncStatus::Conflict),
    ]
}

prop_compose! {
    fn property()(
        id in key(),
        name in text(),
        address in text(),
        owner_name in prop::option::of(text()),
        total_rooms in prop::option::of(any::<u32>()),
        notes in prop::option::of(text()),
        created_at in timestamp(),
        updated_at in timestamp(),
        sync_status in sync_status(),
    ) -> Property {
        Property { id, name, address, owner_name, total_rooms, notes, created_at, updated_at, sync_status }
    }
}

prop_compose! {
    fn room()(
        id in key(),
        property_id in key(),
        room_number in text(),
        floor in prop::option::of(any::<i32>()),
        area_sqm in prop::option::of(finite_f64()),
        monthly_rent in any::<i64>(),
        status in prop_oneof![
            Just(RoomStatus::Vacant),
            Just(RoomStatus::Occupied),
            Just(RoomStatus::Maintenance),
        ],
        notes in prop::option::of(text()),
        created_at in timestamp(),
        updated_at in timestamp(),
        sync_status in sync_status(),
    ) -> Room {
        Room {
            id, property_id, room_number, floor, area_sqm, monthly_rent, status, notes,
            created_at, updated_at, sync_status,
        }
    }
}

prop_compose! {
    fn tenant()(
        id in key(),
        room_id in key(),
        full_name in text(),
        phone in prop::option::of(text()),
        email in prop::option::of(text()),
        id_number in prop::option::of(text()),
        move_in_date in date(),
        move_out_date in prop::option::of(date()),
        deposit in prop::option::of(any::<i64>()),
        created_at in timestamp(),
        updated_at in timestamp(),
        sync_status in sync_status(),
    ) -> Tenant {
        Tenant {
            id, room_id, full_name, phone, email, id_number, move_in_date, move_out_date,
            deposit, created_at, updated_at, sync_status,
        }
    }
}

prop_compose! {
    fn payment()(
        id in key(),
        room_id in key(),
        tenant_id in prop::option::of(key()),
        period in "[0-9]{4}-[0-9]{2}",
        amount in any::<i64>(),
        paid_amount in any::<i64>(),
        status in prop_oneof![
            Just(PaymentStatus::Unpaid),
            Just(PaymentStatus::Partial),
            Just(PaymentStatus::Paid),
        ],
        paid_at in prop::option::of(timestamp()),
        notes in prop::option::of(text()),
        created_at in timestamp(),
        updated_at in timestamp(),
        sync_status in sync_status(),
    ) -> PaymentRecord {
        PaymentRecord {
            id, room_id, tenant_id, period, amount, paid_amount, status, paid_at, notes,
            created_at, updated_at, sync_status,
        }
    }
}

/// Cache `entity` in a fresh SQLite store and read it back by id
fn round_trip<E: Entity>(entity: &E) -> Option<E> {
    runtime().block_on(async {
        let store = EntityStore::new(Arc::new(LocalDatabase::in_memory().await.unwrap()));
        store.cache(entity).await.unwrap();
        store.get::<E>(entity.id()).await.unwrap()
    })
}

/// What the cache holds for an inbound entity: the same record, tagged `synced`
fn as_cached<E: Entity>(entity: &E) -> E {
    let mut cached = entity.clone();
    cached.set_sync_status(SyncStatus::Synced);
    cached
}

proptest! {
    #[test]
    fn test_property_round_trip(property in property()) {
        prop_assert_eq!(round_trip(&property), Some(as_cached(&property)));
    }

    #[test]
    fn test_room_round_trip(room in room()) {
        prop_assert_eq!(round_trip(&room), Some(as_cached(&room)));
    }

    #[test]
    fn test_tenant_round_trip(tenant in tenant()) {
        prop_assert_eq!(round_trip(&tenant), Some(as_cached(&tenant)));
    }

    #[test]
    fn test_payment_round_trip(payment in payment()) {
        prop_assert_eq!(round_trip(&payment), Some(as_cached(&payment)));
    }

    #[test]
    fn test_room_filter_finds_cached_room(room in room()) {
        let rooms = runtime().block_on(async {
            let store = EntityStore::new(Arc::new(LocalDatabase::in_memory().await.unwrap()));
            store.cache(&room).await.unwrap();
            store.get_cached::<Room>(Some(&room.property_id)).await.unwrap()
        });
        prop_assert_eq!(rooms, vec![as_cached(&room)]);
    }

    #[test]
    fn test_queued_snapshot_is_unchanged(room in room()) {
        let data = serde_json::to_value(&room).unwrap();
        let pending = runtime().block_on(async {
            let queue = ChangeQueue::new(Arc::new(LocalDatabase::in_memory().await.unwrap()));
            queue
                .queue_change(NewChange::now(Room::ENTITY_TYPE, room.id.clone(), ChangeOperation::Update, data.clone()))
                .await
                .unwrap();
            queue.get_pending_changes().await.unwrap()
        });

        prop_assert_eq!(&pending[0].data, &data);
        let decoded: Room = serde_json::from_value(pending[0].data.clone()).unwrap();
        prop_assert_eq!(decoded, room);
    }
}
