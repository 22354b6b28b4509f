//! Data source integration tests
//!
//! Covers the process-wide instance and the shared lazy holder under
//! concurrent first access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

use user_repository::db::SharedDataSource;
use user_repository::{AppError, ConnectionSource, DataSource, UserRepository};

use crate::common::{config_for, UserFixtures};

#[test]
fn test_parallel_first_callers_share_one_instance() {
    const CALLERS: usize = 32;
    let dir = tempfile::tempdir().unwrap();
    let shared = SharedDataSource::new();
    let loads = AtomicUsize::new(0);
    let barrier = Barrier::new(CALLERS);

    let instances: Vec<Arc<DataSource>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    shared
                        .get_or_init_with(|| {
                            loads.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(Duration::from_millis(25));
                            Ok(config_for(&dir))
                        })
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    for instance in &instances {
        assert!(Arc::ptr_eq(instance, &instances[0]));
    }
}

#[test]
fn test_process_instance_initialized_once() {
    let dir = tempfile::tempdir().unwrap();
    let first = DataSource::init_instance(config_for(&dir)).unwrap();

    let other_dir = tempfile::tempdir().unwrap();
    let second = DataSource::init_instance(config_for(&other_dir)).unwrap();
    let third = DataSource::instance().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &third));
    assert_eq!(second.config(), &config_for(&dir));
}

#[tokio::test]
async fn test_repository_over_shared_instance() {
    let dir = tempfile::tempdir().unwrap();
    let shared = SharedDataSource::new();
    let source: Arc<dyn ConnectionSource> =
        shared.get_or_init_with(|| Ok(config_for(&dir))).unwrap();

    let repository = UserRepository::new(source).await.unwrap();
    repository.create_user(&UserFixtures::ana()).await.unwrap();

    let again: Arc<dyn ConnectionSource> = shared
        .get_or_init_with(|| panic!("configuration must not be loaded twice"))
        .unwrap();
    let repository = UserRepository::new(again).await.unwrap();
    assert_eq!(repository.find_all_users().await, vec![UserFixtures::ana()]);
}

#[tokio::test]
async fn test_unknown_driver_fails_bootstrap_with_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(&dir);
    config.driver = "org.postgresql.Driver".to_string();

    let source: Arc<dyn ConnectionSource> = Arc::new(DataSource::new(config));
    let err = UserRepository::new(source).await.err().expect("bootstrap should fail");
    assert!(matches!(err, AppError::Connection { .. }));
}

#[test]
fn test_login_timeout_not_implemented() {
    let dir = tempfile::tempdir().unwrap();
    let ds = DataSource::new(config_for(&dir));
    assert!(matches!(
        ds.set_login_timeout(Duration::from_secs(3)),
        Err(AppError::NotImplemented(_))
    ));
}
