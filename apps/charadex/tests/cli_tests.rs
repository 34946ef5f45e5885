//! Integration tests for CLI commands over a snapshot file and on-disk stores.

#![allow(clippy::unwrap_used, clippy::panic)]

use charadex::cli::{self, Cli, Context};
use charadex::AppConfig;
use charadex_core::{Character, CharacterId, Gender};
use clap::Parser;
use std::path::Path;
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn write_snapshot(dir: &Path) -> std::path::PathBuf {
    let records = vec![
        Character::new(1, "Rick Sanchez", "Human").with_gender(Gender::Male),
        Character::new(2, "Morty Smith", "Human").with_gender(Gender::Male),
        Character::new(4, "Birdperson", "Alien").with_gender(Gender::Male),
    ];
    let path = dir.join("snapshot.json");
    std::fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();
    path
}

fn context(dir: &TempDir, backend: &str) -> Context {
    let store_name = if backend == "redb" { "favorites.redb" } else { "favorites.json" };
    Context {
        config: AppConfig {
            store_path: dir.path().join(store_name),
            backend: backend.to_string(),
            ..AppConfig::default()
        },
        snapshot: Some(write_snapshot(dir.path())),
        json_mode: false,
        quiet: true,
    }
}

// =============================================================================
// PERSISTENCE TESTS
// =============================================================================

async fn star_and_comment_survive_restart(backend: &str) {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir, backend);

    cli::cmd_star(&ctx, CharacterId(4)).await.unwrap();
    cli::cmd_comment(&ctx, CharacterId(4), "  Caw caw ").unwrap();

    let reopened = ctx.favorites().unwrap();
    assert!(reopened.is_starred(CharacterId(4)));
    assert_eq!(reopened.comment(CharacterId(4)), Some("Caw caw"));
    assert_eq!(reopened.get(CharacterId(4)).unwrap().name, "Birdperson");
    drop(reopened);

    cli::cmd_unstar(&ctx, CharacterId(4)).unwrap();
    let reopened = ctx.favorites().unwrap();
    assert!(reopened.is_empty());
    assert!(reopened.comments().is_empty());
}

#[tokio::test]
async fn test_file_backend_persists() {
    star_and_comment_survive_restart("file").await;
}

#[tokio::test]
async fn test_redb_backend_persists() {
    star_and_comment_survive_restart("redb").await;
}

#[tokio::test]
async fn test_toggle_twice_restores_empty_set() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir, "file");

    cli::cmd_toggle(&ctx, CharacterId(1)).await.unwrap();
    assert!(ctx.favorites().unwrap().is_starred(CharacterId(1)));
    cli::cmd_toggle(&ctx, CharacterId(1)).await.unwrap();
    assert!(ctx.favorites().unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_on_unstarred_fails() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir, "file");

    let result = cli::cmd_comment(&ctx, CharacterId(2), "aw geez");
    assert!(result.is_err());
}

#[tokio::test]
async fn test_show_missing_is_not_found() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir, "file");

    let err = cli::cmd_show(&ctx, "Jerry Smith").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(cli::cmd_show(&ctx, "morty smith").await.is_ok());
}

#[tokio::test]
async fn test_star_unknown_id_fails() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir, "file");

    let err = cli::cmd_star(&ctx, CharacterId(42)).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(ctx.favorites().unwrap().is_empty());
}

// =============================================================================
// FLAG RESOLUTION TESTS
// =============================================================================

#[test]
fn test_flags_override_config() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("charadex.toml");
    std::fs::write(
        &config_path,
        "backend = \"redb\"\nendpoint = \"http://localhost:4000/graphql\"\n",
    )
    .unwrap();
    let store = dir.path().join("elsewhere.json");

    let cli = Cli::try_parse_from([
        "charadex",
        "--config",
        config_path.to_str().unwrap(),
        "--backend",
        "file",
        "--store",
        store.to_str().unwrap(),
        "favorites",
    ])
    .unwrap();
    let ctx = cli.context().unwrap();

    assert_eq!(ctx.config.backend, "file");
    assert_eq!(ctx.config.store_path, store);
    assert_eq!(ctx.config.endpoint, "http://localhost:4000/graphql");
}

#[test]
fn test_invalid_backend_flag_rejected() {
    let cli = Cli::try_parse_from(["charadex", "--backend", "sqlite", "favorites"]).unwrap();
    assert!(cli.context().is_err());
}
