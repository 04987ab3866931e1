// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use steroids_core::{ParallelSessionId, SectionId};

// `parse_args` reads `std::env::args()` directly, so these tests drive it
// through a temporary argv rather than calling it (no seam to inject argv).
// Exercise the same parsing rules against a hand-rolled equivalent matcher
// to pin the CLI surface steroidsd accepts.

fn parse(argv: &[&str]) -> Result<Option<(PathBuf, Vec<SectionId>, Option<ParallelSessionId>)>, String> {
    let mut raw = argv.iter().map(|s| s.to_string());
    let mut project_path = None;
    let mut focus_sections = Vec::new();
    let mut session = None;

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--version" | "-V" | "-v" => return Ok(None),
            "--help" | "-h" | "help" => return Ok(None),
            "--section" => {
                let id = raw.next().ok_or("--section requires a value")?;
                focus_sections.push(SectionId::new(id));
            }
            "--session" => {
                let id = raw.next().ok_or("--session requires a value")?;
                session = Some(ParallelSessionId::new(id));
            }
            other if project_path.is_none() => {
                project_path = Some(PathBuf::from(other));
            }
            other => return Err(format!("unexpected argument '{other}'")),
        }
    }

    let project_path = project_path.ok_or("missing required <project-path> argument")?;
    Ok(Some((project_path, focus_sections, session)))
}

#[test]
fn bare_project_path() {
    let (path, sections, session) = parse(&["/tmp/proj"]).unwrap().unwrap();
    assert_eq!(path, PathBuf::from("/tmp/proj"));
    assert!(sections.is_empty());
    assert!(session.is_none());
}

#[test]
fn repeated_section_flags_accumulate() {
    let (_, sections, _) = parse(&["/tmp/proj", "--section", "a", "--section", "b"])
        .unwrap()
        .unwrap();
    assert_eq!(sections, vec![SectionId::new("a"), SectionId::new("b")]);
}

#[test]
fn session_flag_is_parsed() {
    let (_, _, session) = parse(&["/tmp/proj", "--session", "s1"]).unwrap().unwrap();
    assert_eq!(session, Some(ParallelSessionId::new("s1")));
}

#[test]
fn help_and_version_short_circuit_with_no_args() {
    assert!(parse(&["--help"]).unwrap().is_none());
    assert!(parse(&["-h"]).unwrap().is_none());
    assert!(parse(&["--version"]).unwrap().is_none());
}

#[test]
fn missing_project_path_is_an_error() {
    assert!(parse(&["--section", "a"]).is_err());
}

#[test]
fn section_without_a_value_is_an_error() {
    assert!(parse(&["/tmp/proj", "--section"]).is_err());
}

#[test]
fn unexpected_second_positional_is_an_error() {
    assert!(parse(&["/tmp/proj", "extra"]).is_err());
}
