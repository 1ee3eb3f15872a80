//! Record store behaviour against the scripted control plane
//!
//! Covers:
//! 1. Idempotent create and the create/replace sequence
//! 2. Exact-value removal on update and delete
//! 3. Abort-on-failure with the first error preserved
//! 4. Validation normalization and allow-list matching

use std::sync::Arc;

use hyprknot::control_plane::testing::ScriptedControlPlane;
use hyprknot::zone::codec;
use hyprknot::zone::validation::validated;
use hyprknot::zone::{
    AllowList, CreateOutcome, Record, RecordStore, RecordType, UpdateDelta, ZoneError,
};

fn plane() -> Arc<ScriptedControlPlane> {
    Arc::new(ScriptedControlPlane::new().with_zone("example.com"))
}

fn store(plane: &Arc<ScriptedControlPlane>) -> RecordStore {
    RecordStore::new(plane.clone(), AllowList::unrestricted())
}

/// Subcommands that change zone state
fn mutations(plane: &ScriptedControlPlane) -> Vec<String> {
    plane
        .subcommands()
        .into_iter()
        .filter(|c| c != "zone-read")
        .collect()
}

fn test_vm(data: &str) -> Record {
    Record::new("test-vm", RecordType::A, 300, data)
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_is_idempotent_end_to_end() {
    let plane = plane();
    let store = store(&plane);

    let first = store.create_record("example.com", test_vm("192.168.1.100")).await.unwrap();
    assert!(matches!(first, CreateOutcome::Created(_)));
    assert_eq!(mutations(&plane), ["zone-begin", "zone-set", "zone-commit"]);
    assert_eq!(
        plane.commands()[2],
        ["zone-set", "example.com.", "test-vm", "300", "A", "192.168.1.100"]
    );

    plane.clear_commands();
    let second = store.create_record("example.com", test_vm("192.168.1.100")).await.unwrap();
    assert!(second.is_unchanged());
    assert!(mutations(&plane).is_empty());

    plane.clear_commands();
    let third = store.create_record("example.com", test_vm("192.168.1.200")).await.unwrap();
    assert!(matches!(third, CreateOutcome::Replaced(_)));
    assert_eq!(
        mutations(&plane),
        ["zone-begin", "zone-unset", "zone-set", "zone-commit"]
    );
    assert!(plane.commands().contains(
        &["zone-unset", "example.com.", "test-vm", "A", "192.168.1.100"]
            .map(String::from)
            .to_vec()
    ));

    let test_vm_a: Vec<Record> = plane
        .records("example.com")
        .into_iter()
        .filter(|r| r.name == "test-vm.example.com." && r.record_type == RecordType::A)
        .collect();
    assert_eq!(test_vm_a.len(), 1);
    assert_eq!(test_vm_a[0].data, "192.168.1.200");

    let fetched = store
        .get_record("example.com", "test-vm", RecordType::A)
        .await
        .unwrap();
    assert_eq!(fetched.data, "192.168.1.200");

    plane.clear_commands();
    let fourth = store.create_record("example.com", test_vm("192.168.1.200")).await.unwrap();
    assert!(fourth.is_unchanged());
    assert!(mutations(&plane).is_empty());
}

#[tokio::test]
async fn test_failed_replace_is_aborted_and_old_value_kept() {
    let plane = Arc::new(
        ScriptedControlPlane::new()
            .with_record("example.com", "test-vm.example.com. 300 IN A 192.168.1.100"),
    );
    plane.fail_on("zone-set");

    let err = store(&plane)
        .create_record("example.com", test_vm("192.168.1.200"))
        .await
        .unwrap_err();

    assert!(matches!(err, ZoneError::ControlPlane { ref command, .. } if command == "zone-set"));
    assert_eq!(
        mutations(&plane),
        ["zone-begin", "zone-unset", "zone-set", "zone-abort"]
    );
    let remaining = plane.records("example.com");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].data, "192.168.1.100");
}

#[tokio::test]
async fn test_create_normalizes_before_sending() {
    let plane = plane();
    let created = store(&plane)
        .create_record(
            "example.com",
            Record::new("@", RecordType::Mx, 0, "mail.example.com").with_priority(10),
        )
        .await
        .unwrap();

    assert_eq!(created.record().ttl, 300);
    assert_eq!(created.record().data, "mail.example.com.");
    assert_eq!(
        plane.commands().last().map(|c| c[0].clone()),
        Some("zone-commit".to_string())
    );
    assert!(plane
        .commands()
        .contains(&["zone-set", "example.com.", "@", "300", "MX", "10", "mail.example.com."]
            .map(String::from)
            .to_vec()));
}

#[tokio::test]
async fn test_failed_set_is_aborted_and_set_error_returned() {
    let plane = plane();
    plane.fail_on("zone-set");
    plane.fail_on("zone-abort");

    let err = store(&plane)
        .create_record("example.com", test_vm("192.168.1.100"))
        .await
        .unwrap_err();

    assert!(matches!(err, ZoneError::ControlPlane { ref command, .. } if command == "zone-set"));
    assert_eq!(mutations(&plane), ["zone-begin", "zone-set", "zone-abort"]);
    assert!(plane.records("example.com").is_empty());
}

#[tokio::test]
async fn test_failed_commit_is_aborted() {
    let plane = plane();
    plane.fail_on("zone-commit");

    let err = store(&plane)
        .create_record("example.com", test_vm("192.168.1.100"))
        .await
        .unwrap_err();

    assert!(matches!(err, ZoneError::ControlPlane { ref command, .. } if command == "zone-commit"));
    assert_eq!(mutations(&plane), ["zone-begin", "zone-set", "zone-commit", "zone-abort"]);
    assert!(!plane.has_open_transaction("example.com"));
}

#[tokio::test]
async fn test_failed_begin_sends_no_abort() {
    let plane = plane();
    plane.fail_on("zone-begin");

    let err = store(&plane)
        .create_record("example.com", test_vm("192.168.1.100"))
        .await
        .unwrap_err();

    assert!(matches!(err, ZoneError::ControlPlane { ref command, .. } if command == "zone-begin"));
    assert_eq!(mutations(&plane), ["zone-begin"]);
}

// =============================================================================
// Update and delete
// =============================================================================

fn two_www_records() -> Arc<ScriptedControlPlane> {
    Arc::new(
        ScriptedControlPlane::new()
            .with_record("example.com", "www.example.com. 300 IN A 192.0.2.1")
            .with_record("example.com", "www.example.com. 300 IN A 192.0.2.2"),
    )
}

#[tokio::test]
async fn test_update_leaves_sibling_untouched() {
    let plane = two_www_records();
    let delta = UpdateDelta {
        data: Some("192.0.2.3".to_string()),
        ..Default::default()
    };

    let updated = store(&plane)
        .update_record("example.com", "www", RecordType::A, &delta)
        .await
        .unwrap();
    assert_eq!(updated.data, "192.0.2.3");

    let data: Vec<String> = plane.records("example.com").into_iter().map(|r| r.data).collect();
    assert!(data.contains(&"192.0.2.2".to_string()));
    assert!(data.contains(&"192.0.2.3".to_string()));
    assert!(!data.contains(&"192.0.2.1".to_string()));

    assert!(plane.commands().contains(
        &["zone-unset", "example.com.", "www", "A", "192.0.2.1"]
            .map(String::from)
            .to_vec()
    ));
    assert_eq!(
        mutations(&plane),
        ["zone-begin", "zone-unset", "zone-set", "zone-commit"]
    );
}

#[tokio::test]
async fn test_update_keeps_absent_fields() {
    let plane = Arc::new(
        ScriptedControlPlane::new()
            .with_record("example.com", "example.com. 3600 IN MX 10 mail.example.com."),
    );
    let delta = UpdateDelta {
        ttl: Some(600),
        ..Default::default()
    };

    let updated = store(&plane)
        .update_record("example.com", "@", RecordType::Mx, &delta)
        .await
        .unwrap();

    assert_eq!(updated.ttl, 600);
    assert_eq!(updated.priority, Some(10));
    assert_eq!(updated.data, "mail.example.com.");
}

#[tokio::test]
async fn test_update_rejects_invalid_merge_without_mutation() {
    let plane = two_www_records();
    let delta = UpdateDelta {
        data: Some("2001:db8::1".to_string()),
        ..Default::default()
    };

    let err = store(&plane)
        .update_record("example.com", "www", RecordType::A, &delta)
        .await
        .unwrap_err();

    assert!(matches!(err, ZoneError::Validation(_)));
    assert!(mutations(&plane).is_empty());
}

#[tokio::test]
async fn test_update_missing_record_is_not_found() {
    let plane = plane();
    let err = store(&plane)
        .update_record("example.com", "ghost", RecordType::A, &UpdateDelta::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ZoneError::NotFound { .. }));
    assert!(mutations(&plane).is_empty());
}

#[tokio::test]
async fn test_delete_removes_exact_value_only() {
    let plane = two_www_records();
    let deleted = store(&plane)
        .delete_record("example.com", "www", RecordType::A)
        .await
        .unwrap();

    assert_eq!(deleted.data, "192.0.2.1");
    let remaining = plane.records("example.com");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].data, "192.0.2.2");
    assert_eq!(mutations(&plane), ["zone-begin", "zone-unset", "zone-commit"]);
}

#[tokio::test]
async fn test_failed_unset_on_delete_is_aborted() {
    let plane = two_www_records();
    plane.fail_on("zone-unset");

    let err = store(&plane)
        .delete_record("example.com", "www", RecordType::A)
        .await
        .unwrap_err();

    assert!(matches!(err, ZoneError::ControlPlane { ref command, .. } if command == "zone-unset"));
    assert_eq!(mutations(&plane), ["zone-begin", "zone-unset", "zone-abort"]);
    assert_eq!(plane.records("example.com").len(), 2);
}

// =============================================================================
// Pure components
// =============================================================================

#[test]
fn test_validation_appends_one_dot_and_is_a_fixed_point() {
    for record_type in [RecordType::Ptr, RecordType::Cname, RecordType::Ns] {
        let once = validated(Record::new("alias", record_type, 300, "target.example.com")).unwrap();
        assert_eq!(once.data, "target.example.com.");
        let twice = validated(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    let mx = validated(Record::new("@", RecordType::Mx, 300, "mail.example.com").with_priority(5)).unwrap();
    assert_eq!(mx.data, "mail.example.com.");
    assert_eq!(validated(mx.clone()).unwrap(), mx);
}

#[test]
fn test_allow_list_anchors_on_label_boundary() {
    let allow = AllowList::new(["example.com"]);
    assert!(allow.is_allowed("a.b.example.com"));
    assert!(allow.is_allowed("example.com."));
    assert!(!allow.is_allowed("notexample.com"));
    assert!(AllowList::unrestricted().is_allowed("anything.org"));
}

#[test]
fn test_format_of_parse_preserves_fields() {
    for line in [
        "www.example.com. 300 IN A 192.0.2.1",
        "www.example.com. 300 A 192.0.2.1",
        "[example.com.] txt.example.com. 60 TXT \"hello world\"",
        "alias 3600 CNAME target.example.com.",
    ] {
        let parsed = codec::parse(line).unwrap();
        let reparsed = codec::parse(&codec::format(&parsed)).unwrap();
        assert_eq!(parsed, reparsed, "line: {}", line);
    }
}
