//! Hot-Reload Integration Tests

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use hotconf::{ConfigManager, Result, StaticContentProvider, TracingSink};
use tempfile::TempDir;
use tokio::time::sleep;

/// Route sink events to stderr during test runs; repeated calls are fine
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn test_external_edit_triggers_reload() -> Result<()> {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(&config_path, "server:\n  max_connections: 1000\n").unwrap();

    let manager = ConfigManager::new(temp_dir.path(), "config.yml").await?;
    let mut reloads = manager.subscribe();
    manager.enable_hot_reloading().await?;

    assert_eq!(manager.get_int("server.max_connections", 0).await, 1000);

    // External edit
    fs::write(&config_path, "server:\n  max_connections: 2000\n").unwrap();

    tokio::select! {
        event = reloads.recv() => {
            let event = event.expect("reload channel closed");
            assert_eq!(event.path, config_path);
        }
        _ = sleep(Duration::from_secs(5)) => {
            panic!("Reload event not received within timeout");
        }
    }

    assert_eq!(manager.get_int("server.max_connections", 0).await, 2000);

    manager.disable_hot_reloading().await;
    Ok(())
}

#[tokio::test]
async fn test_edit_burst_coalesces_into_one_reload() -> Result<()> {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("app.conf");
    fs::write(&config_path, "retries=1\n").unwrap();

    let manager = ConfigManager::new(temp_dir.path(), "app.conf").await?;
    let mut reloads = manager.subscribe();
    manager.enable_hot_reloading().await?;

    // Several writes in quick succession, as an editor's save would produce
    fs::write(&config_path, "retries=2\n").unwrap();
    fs::write(&config_path, "retries=3\n").unwrap();
    fs::write(&config_path, "retries=4\n").unwrap();

    tokio::select! {
        event = reloads.recv() => {
            event.expect("reload channel closed");
        }
        _ = sleep(Duration::from_secs(5)) => {
            panic!("Reload event not received within timeout");
        }
    }
    assert_eq!(manager.get_int("retries", 0).await, 4);

    // The burst folds into a single reload; no trailing event follows
    tokio::select! {
        _ = reloads.recv() => {
            panic!("Coalesced burst should produce exactly one reload");
        }
        _ = sleep(Duration::from_millis(400)) => {}
    }

    manager.disable_hot_reloading().await;
    Ok(())
}

#[tokio::test]
async fn test_no_reload_after_disable() -> Result<()> {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(&config_path, "key: before\n").unwrap();

    let manager = ConfigManager::new(temp_dir.path(), "config.yml").await?;
    let mut reloads = manager.subscribe();
    manager.enable_hot_reloading().await?;
    manager.disable_hot_reloading().await;
    assert!(!manager.is_hot_reloading().await);

    fs::write(&config_path, "key: after\n").unwrap();

    tokio::select! {
        _ = reloads.recv() => {
            panic!("No reload may fire after disable_hot_reloading returns");
        }
        _ = sleep(Duration::from_millis(500)) => {}
    }
    assert_eq!(manager.get_string("key", "").await, "before");
    Ok(())
}

#[tokio::test]
async fn test_invalid_edit_keeps_previous_values() -> Result<()> {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(&config_path, "server:\n  port: 8080\n").unwrap();

    let manager = ConfigManager::new(temp_dir.path(), "config.yml").await?;
    let mut reloads = manager.subscribe();
    manager.enable_hot_reloading().await?;

    // One bad external edit must not wedge hot reload
    fs::write(&config_path, "server: [unclosed\n").unwrap();
    sleep(Duration::from_millis(500)).await;
    assert_eq!(manager.get_int("server.port", 0).await, 8080);

    // The next valid edit succeeds on its own triggered reload
    fs::write(&config_path, "server:\n  port: 9090\n").unwrap();
    tokio::select! {
        event = reloads.recv() => {
            event.expect("reload channel closed");
        }
        _ = sleep(Duration::from_secs(5)) => {
            panic!("Reload event not received within timeout");
        }
    }
    assert_eq!(manager.get_int("server.port", 0).await, 9090);

    manager.disable_hot_reloading().await;
    Ok(())
}

#[tokio::test]
async fn test_set_file_rebinds_watcher() -> Result<()> {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("first.conf"), "origin=first\n").unwrap();
    fs::write(temp_dir.path().join("second.conf"), "origin=second\n").unwrap();

    let manager = ConfigManager::new(temp_dir.path(), "first.conf").await?;
    let mut reloads = manager.subscribe();
    manager.enable_hot_reloading().await?;

    manager.set_file("second.conf").await?;
    assert!(manager.is_hot_reloading().await);
    assert_eq!(manager.get_string("origin", "").await, "second");

    // Edits to the old file are ignored after the rebind
    fs::write(temp_dir.path().join("first.conf"), "origin=stale\n").unwrap();
    // Edits to the new file trigger reloads
    fs::write(temp_dir.path().join("second.conf"), "origin=updated\n").unwrap();

    tokio::select! {
        event = reloads.recv() => {
            let event = event.expect("reload channel closed");
            assert_eq!(event.path, temp_dir.path().join("second.conf"));
        }
        _ = sleep(Duration::from_secs(5)) => {
            panic!("Reload event not received within timeout");
        }
    }
    assert_eq!(manager.get_string("origin", "").await, "updated");

    manager.disable_hot_reloading().await;
    Ok(())
}

#[tokio::test]
async fn test_first_run_materializes_template() -> Result<()> {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let provider = StaticContentProvider::new()
        .with_template("app.conf", "# defaults\n\nretries=3\nenabled=true\n");

    let manager = ConfigManager::with_collaborators(
        temp_dir.path(),
        "app.conf",
        Arc::new(provider),
        Arc::new(TracingSink),
    )
    .await?;

    assert!(temp_dir.path().join("app.conf").exists());
    assert_eq!(manager.get_int("retries", 0).await, 3);
    assert!(manager.get_bool("enabled", false).await);
    assert_eq!(manager.get_int("missing", 7).await, 7);
    Ok(())
}
