//! Zone and owner name canonicalization.

/// Absolute, lowercase, trailing-dot form of a zone name
pub fn canonical_zone(zone: &str) -> String {
    let mut zone = zone.trim().to_ascii_lowercase();
    if !zone.ends_with('.') {
        zone.push('.');
    }
    zone
}

/// Fully qualified form of an owner name within `zone`.
///
/// `zone` must already be canonical. `@` and the empty name denote the apex.
pub fn qualify_owner(name: &str, zone: &str) -> String {
    let name = name.trim().to_ascii_lowercase();
    if name.is_empty() || name == "@" {
        return zone.to_string();
    }
    if name.ends_with('.') {
        return name;
    }
    let bare_zone = zone.trim_end_matches('.');
    if name == bare_zone || name.ends_with(&format!(".{}", bare_zone)) {
        return format!("{}.", name);
    }
    format!("{}.{}", name, zone)
}

/// Owner name relative to `zone`, as passed to `zone-set` and `zone-unset`.
///
/// Names outside the zone are returned in absolute form and left for knotc
/// to reject.
pub fn relative_owner(name: &str, zone: &str) -> String {
    let qualified = qualify_owner(name, zone);
    if qualified == zone {
        return "@".to_string();
    }
    match qualified.strip_suffix(&format!(".{}", zone)) {
        Some(relative) => relative.to_string(),
        None => qualified,
    }
}

/// Whether two owner names denote the same node of `zone`
pub fn same_owner(a: &str, b: &str, zone: &str) -> bool {
    qualify_owner(a, zone) == qualify_owner(b, zone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_zone() {
        assert_eq!(canonical_zone("example.com"), "example.com.");
        assert_eq!(canonical_zone("Example.COM."), "example.com.");
    }

    #[test]
    fn test_qualify_owner() {
        let zone = "example.com.";
        assert_eq!(qualify_owner("test-vm", zone), "test-vm.example.com.");
        assert_eq!(qualify_owner("test-vm.example.com", zone), "test-vm.example.com.");
        assert_eq!(qualify_owner("test-vm.example.com.", zone), "test-vm.example.com.");
        assert_eq!(qualify_owner("@", zone), "example.com.");
        assert_eq!(qualify_owner("example.com", zone), "example.com.");
        assert_eq!(qualify_owner("WWW", zone), "www.example.com.");
    }

    #[test]
    fn test_relative_owner() {
        let zone = "example.com.";
        assert_eq!(relative_owner("test-vm.example.com.", zone), "test-vm");
        assert_eq!(relative_owner("a.b", zone), "a.b");
        assert_eq!(relative_owner("example.com.", zone), "@");
        assert_eq!(relative_owner("host.other.org.", zone), "host.other.org.");
    }

    #[test]
    fn test_same_owner_ignores_form() {
        assert!(same_owner("test-vm", "test-vm.example.com.", "example.com."));
        assert!(!same_owner("test-vm", "test-vm2.example.com.", "example.com."));
        // label boundary: "notexample.com" is not inside "example.com"
        assert_eq!(
            qualify_owner("notexample.com", "example.com."),
            "notexample.com.example.com."
        );
    }
}
