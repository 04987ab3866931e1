// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

fn id(s: &str) -> SectionId {
    SectionId::new(s)
}

#[test]
fn no_cycle_for_fresh_edge() {
    let edges = HashMap::new();
    assert!(!would_create_cycle(&edges, &id("a"), &id("b")));
}

#[test]
fn self_dependency_is_a_cycle() {
    let edges = HashMap::new();
    assert!(would_create_cycle(&edges, &id("a"), &id("a")));
}

#[test]
fn direct_back_edge_is_a_cycle() {
    let mut edges = HashMap::new();
    edges.insert(id("b"), vec![id("a")]);
    // a -> b would close a<-b<-a
    assert!(would_create_cycle(&edges, &id("a"), &id("b")));
}

#[test]
fn transitive_back_edge_is_a_cycle() {
    let mut edges = HashMap::new();
    edges.insert(id("b"), vec![id("a")]);
    edges.insert(id("c"), vec![id("b")]);
    // a -> c would close a<-c<-b<-a
    assert!(would_create_cycle(&edges, &id("a"), &id("c")));
}

#[test]
fn unrelated_edge_is_not_a_cycle() {
    let mut edges = HashMap::new();
    edges.insert(id("b"), vec![id("a")]);
    edges.insert(id("d"), vec![id("c")]);
    assert!(!would_create_cycle(&edges, &id("c"), &id("b")));
}
