//! Property-based tests for rust-common crate.
//!
//! These tests verify universal properties of the in-memory store using proptest.

use proptest::prelude::*;
use rust_common::{KvStore, KvStoreConfig, MemoryStore, PlatformError};
use std::time::Duration;

fn arb_key() -> impl Strategy<Value = String> {
    "[a-f0-9-]{1,36}".prop_map(|s| s)
}

fn arb_value() -> impl Strategy<Value = String> {
    "[0-9]{1,20}".prop_map(|s| s)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A value written with a positive TTL is readable until deleted,
    /// and deletion reports exactly one removal.
    #[test]
    fn prop_set_get_delete(key in arb_key(), value in arb_value(), ttl in 1u64..86_400) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = MemoryStore::new(KvStoreConfig::default().with_namespace("prop"));

            store.set_ex(&key, &value, Duration::from_secs(ttl)).await.unwrap();
            prop_assert_eq!(store.get(&key).await.unwrap(), Some(value.clone()));

            prop_assert_eq!(store.delete(&key).await.unwrap(), 1);
            prop_assert_eq!(store.get(&key).await.unwrap(), None);

            Ok(())
        })?;
    }

    /// Deleting is idempotent: repeated deletes of an absent key report zero.
    #[test]
    fn prop_delete_idempotent(key in arb_key(), repeats in 1usize..5) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = MemoryStore::default();
            for _ in 0..repeats {
                prop_assert_eq!(store.delete(&key).await.unwrap(), 0);
            }
            Ok(())
        })?;
    }

    /// Only unavailable and internal errors are infrastructure failures.
    #[test]
    fn prop_infrastructure_classification(msg in "[a-zA-Z0-9 ]{1,50}") {
        prop_assert!(PlatformError::unavailable(msg.clone()).is_infrastructure());
        prop_assert!(PlatformError::Internal(msg.clone()).is_infrastructure());
        prop_assert!(!PlatformError::invalid_input(msg).is_infrastructure());
    }
}

#[tokio::test]
async fn test_zero_ttl_rejected() {
    let store = MemoryStore::default();
    let result = store.set_ex("k", "v", Duration::ZERO).await;
    assert!(matches!(result, Err(PlatformError::InvalidInput(_))));
    assert!(store.is_empty().await);
}
