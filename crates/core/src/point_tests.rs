// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn point(file: &str, line: u32) -> ModificationPoint {
    ModificationPoint::new(file, line, vec!["int x = 0;".to_string()])
}

#[test]
fn identity_is_stable() {
    assert_eq!(point("src/App.java", 7).identity(), point("src/App.java", 7).identity());
}

#[test]
fn identity_is_short_hex() {
    let id = point("src/App.java", 7).identity();
    assert_eq!(id.len(), 12);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn identity_differs_per_line() {
    assert_ne!(point("src/App.java", 7).identity(), point("src/App.java", 8).identity());
}

#[test]
fn identity_differs_per_file() {
    assert_ne!(point("src/A.java", 7).identity(), point("src/B.java", 7).identity());
}

#[test]
fn identity_differs_per_context() {
    let a = ModificationPoint::new("src/App.java", 7, vec!["x".to_string()]);
    let b = ModificationPoint::new("src/App.java", 7, vec!["y".to_string()]);
    assert_ne!(a.identity(), b.identity());
}

#[test]
fn suspiciousness_defaults_to_zero() {
    let p = point("src/App.java", 7);
    assert_eq!(p.suspiciousness, 0.0);
    assert_eq!(p.with_suspiciousness(0.9).suspiciousness, 0.9);
}

#[test]
fn point_serde_round_trip() {
    let p = point("src/App.java", 7).with_suspiciousness(0.5);
    let json = serde_json::to_string(&p).unwrap();
    let parsed: ModificationPoint = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, p);
}
