use rmrf_core::{DeleteConfig, DeleteError, DeleteStats, ItemError, ItemErrorKind};
use std::path::PathBuf;

#[test]
fn test_config_serde_defaults() {
    // Missing fields fall back to the same defaults as DeleteConfig::new()
    let config: DeleteConfig = serde_json::from_str("{}").unwrap();
    let defaults = DeleteConfig::new();

    assert_eq!(config.max_concurrency, defaults.max_concurrency);
    assert_eq!(config.skip_symlinks, defaults.skip_symlinks);
    assert_eq!(config.dangerous_paths, defaults.dangerous_paths);
    assert!(!config.dry_run);
}

#[test]
fn test_config_builder_custom_dangerous_paths() {
    let config = DeleteConfig::builder()
        .dangerous_paths(vec![PathBuf::from("/data")])
        .build()
        .unwrap();

    assert_eq!(config.dangerous_paths, vec![PathBuf::from("/data")]);
}

#[test]
fn test_config_builder_rejects_empty_dangerous_path() {
    let result = DeleteConfig::builder()
        .dangerous_paths(vec![PathBuf::new()])
        .build();
    assert!(result.is_err());
}

#[test]
fn test_stats_json_round_trip() {
    let stats = DeleteStats {
        files_deleted: 10,
        dirs_deleted: 2,
        errors: vec![ItemError::new(
            "/tmp/x/locked",
            ItemErrorKind::Remove,
            "Permission denied",
        )],
        cancelled: false,
    };

    let json = serde_json::to_string(&stats).unwrap();
    assert!(json.contains("\"filesDeleted\":10"));
    assert!(json.contains("\"kind\":\"remove\""));

    let back: DeleteStats = serde_json::from_str(&json).unwrap();
    assert_eq!(back, stats);
    assert_eq!(back.total_deleted(), 12);
}

#[test]
fn test_item_error_kinds_serialize_camel_case() {
    let json = serde_json::to_string(&ItemErrorKind::PermissionAdjust).unwrap();
    assert_eq!(json, "\"permissionAdjust\"");
    let json = serde_json::to_string(&ItemErrorKind::SymlinkSkipped).unwrap();
    assert_eq!(json, "\"symlinkSkipped\"");
}

#[test]
fn test_delete_error_sources() {
    use std::error::Error;

    let err = DeleteError::NotExist {
        path: "/nope".into(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
    };
    assert!(!err.is_dangerous());
    assert!(err.source().is_some());
    assert!(err.to_string().contains("/nope"));
}
