//! Concurrency stress tests for the shared crypto context and reference generator
//!
//! These tests verify thread-safety under high contention

mod common;

#[cfg(test)]
mod concurrency_tests {
    use super::common::{card_record, keyed_crypto};
    use payguard_lib::{generate_reference, PaymentError, PaymentRecord};
    use std::collections::HashSet;
    use std::sync::Arc;
    use tokio::task::JoinSet;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_tokenize_roundtrip() {
        let crypto = Arc::new(keyed_crypto());
        let mut tasks = JoinSet::new();

        for i in 0..100i64 {
            let crypto = Arc::clone(&crypto);
            tasks.spawn(async move {
                let record = card_record().with("sequence", i);
                let token = crypto.tokenize(&record)?;
                let opened = crypto.detokenize(&token)?;
                Ok::<_, PaymentError>((record, opened))
            });
        }

        let mut completed = 0;
        while let Some(result) = tasks.join_next().await {
            let (record, opened) = result.unwrap().unwrap();
            assert_eq!(record, opened);
            completed += 1;
        }
        assert_eq!(completed, 100);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_hashing() {
        let crypto = Arc::new(keyed_crypto());
        let mut tasks = JoinSet::new();

        for _ in 0..100 {
            let crypto = Arc::clone(&crypto);
            tasks.spawn(async move {
                let hashed = crypto.hash_data("4532015112830366")?;
                let verified = crypto.verify_hash("4532015112830366", &hashed)?;
                Ok::<_, PaymentError>((hashed, verified))
            });
        }

        let mut hashes = HashSet::new();
        while let Some(result) = tasks.join_next().await {
            let (hashed, verified) = result.unwrap().unwrap();
            assert!(verified);
            hashes.insert(hashed);
        }
        // Fresh salt per call
        assert_eq!(hashes.len(), 100);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_key_rotation_under_load() {
        let crypto = Arc::new(keyed_crypto());
        let mut tasks = JoinSet::new();

        for i in 0..200i64 {
            let crypto = Arc::clone(&crypto);
            tasks.spawn(async move {
                if i == 100 {
                    crypto.set_secret_key("rotated-secret")?;
                }
                let record = PaymentRecord::new().with("sequence", i);
                let token = crypto.tokenize(&record)?;
                match crypto.detokenize(&token) {
                    Ok(opened) => {
                        assert_eq!(opened, record, "never a different record");
                        Ok::<bool, PaymentError>(true)
                    }
                    // Key swapped between tokenize and detokenize
                    Err(PaymentError::TokenInvalid(_)) => Ok(false),
                    Err(e) => Err(e),
                }
            });
        }

        while let Some(result) = tasks.join_next().await {
            assert!(result.unwrap().is_ok());
        }

        // Every call after the rotation uses the new key
        let token = crypto.tokenize(&PaymentRecord::new().with("after", true)).unwrap();
        let fresh = payguard_lib::PaymentCrypto::with_secret_key("rotated-secret").unwrap();
        assert!(fresh.detokenize(&token).is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_references_unique() {
        let mut tasks = JoinSet::new();

        for _ in 0..50 {
            tasks.spawn(async move { (0..200).map(|_| generate_reference()).collect::<Vec<_>>() });
        }

        let mut seen = HashSet::new();
        while let Some(result) = tasks.join_next().await {
            for reference in result.unwrap() {
                assert!(seen.insert(reference), "duplicate reference");
            }
        }
        assert_eq!(seen.len(), 10_000);
    }
}
