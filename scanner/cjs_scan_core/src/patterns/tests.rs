#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn lookup_finds_every_trigger() {
    for trigger in TRIGGERS {
        let found = lookup(trigger.name).expect("trigger must resolve to itself");
        assert_eq!(found.kind, trigger.kind);
    }
}

#[test]
fn lookup_unknown_is_none() {
    assert!(lookup(b"require").is_none());
    assert!(lookup(b"export").is_none());
    assert!(lookup(b"Exports").is_none());
    assert!(lookup(b"").is_none());
}

#[test]
fn binding_triggers_reject_member_position() {
    for name in [b"exports".as_slice(), b"module", b"Object"] {
        let trigger = lookup(name).expect("core trigger present");
        assert!(!trigger.allow_after_dot, "{name:?} must not fire after `.`");
    }
}

#[test]
fn helper_triggers_accept_member_position() {
    for name in [b"__export".as_slice(), b"__exportStar", b"__reExport"] {
        let trigger = lookup(name).expect("helper trigger present");
        assert_eq!(trigger.kind, PatternKind::ReexportHelper);
        assert!(trigger.allow_after_dot, "{name:?} must fire after `.`");
    }
}

#[test]
fn kinds_are_as_documented() {
    assert_eq!(
        lookup(b"exports").map(|t| t.kind),
        Some(PatternKind::ExportsMember)
    );
    assert_eq!(
        lookup(b"module").map(|t| t.kind),
        Some(PatternKind::ModuleExports)
    );
    assert_eq!(
        lookup(b"Object").map(|t| t.kind),
        Some(PatternKind::DefineHost)
    );
}
