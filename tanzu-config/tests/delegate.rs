//! Integration tests for delegating active-resource updates to the CLI.
//!
//! A fake CLI script stands in for the real binary. Both output sinks point
//! at the same buffer so the combined output can be compared as a whole.

#![cfg(unix)]

mod common;

use std::fs;
use std::os::unix::fs::PermissionsExt;

use common::{fake_cli, SharedBuffer};
use serial_test::serial;
use tanzu_config::delegate::{CommandOptions, TANZU_BIN_ENV};
use tanzu_config::{set_tanzu_context_active_resource, Error};
use tempfile::TempDir;

struct Case {
    name: &'static str,
    status: u8,
    new_status: u8,
    custom_command: bool,
    expect_error: bool,
    expected_output: &'static str,
}

const CASES: &[Case] = &[
    Case {
        name: "command succeeds",
        status: 0,
        new_status: 0,
        custom_command: false,
        expect_error: false,
        expected_output:
            "context update tanzu-active-resource test-context --project projectA --space spaceA succeeded\n",
    },
    Case {
        name: "command fails",
        status: 1,
        new_status: 0,
        custom_command: false,
        expect_error: true,
        expected_output:
            "context update tanzu-active-resource test-context --project projectA --space spaceA failed\n",
    },
    Case {
        name: "alternate command succeeds",
        status: 1,
        new_status: 0,
        custom_command: true,
        expect_error: false,
        expected_output:
            "newcommand update tanzu-active-resource test-context --project projectA --space spaceA succeeded\n",
    },
    Case {
        name: "alternate command fails",
        status: 0,
        new_status: 1,
        custom_command: true,
        expect_error: true,
        expected_output:
            "newcommand update tanzu-active-resource test-context --project projectA --space spaceA failed\n",
    },
];

#[test]
#[serial]
fn test_set_active_resource_through_cli() {
    for case in CASES {
        let dir = TempDir::new().unwrap();
        let cli = fake_cli(dir.path(), case.status, case.new_status, case.custom_command);
        std::env::set_var(TANZU_BIN_ENV, &cli);

        let buffer = SharedBuffer::new();
        let options = CommandOptions::new()
            .with_output_writer(buffer.clone())
            .with_error_writer(buffer.clone());
        let result =
            set_tanzu_context_active_resource("test-context", "projectA", "spaceA", options);
        std::env::remove_var(TANZU_BIN_ENV);

        assert_eq!(result.is_err(), case.expect_error, "{}: {result:?}", case.name);
        assert_eq!(buffer.contents(), case.expected_output, "{}", case.name);
    }
}

#[test]
#[serial]
fn test_failure_reports_command_and_output() {
    let dir = TempDir::new().unwrap();
    let cli = fake_cli(dir.path(), 2, 0, false);

    let options = CommandOptions::new()
        .with_binary(&cli)
        .with_output_writer(std::io::sink())
        .with_error_writer(std::io::sink());
    let err = set_tanzu_context_active_resource("test-context", "projectA", "", options)
        .unwrap_err();

    match err {
        Error::Subprocess {
            command, output, ..
        } => {
            assert!(command.ends_with(
                "context update tanzu-active-resource test-context --project projectA --space "
            ));
            // the empty space argument leaves a double blank
            assert_eq!(
                output,
                "context update tanzu-active-resource test-context --project projectA --space  failed"
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
#[serial]
fn test_shared_sink_gets_stdout_before_stderr() {
    let dir = TempDir::new().unwrap();
    let cli = dir.path().join("tanzu");
    fs::write(
        &cli,
        "#!/bin/bash\n[ \"$1\" = \"_custom_command\" ] && exit 1\n>&2 echo first-err\necho then-out\n",
    )
    .unwrap();
    fs::set_permissions(&cli, fs::Permissions::from_mode(0o755)).unwrap();

    let buffer = SharedBuffer::new();
    let options = CommandOptions::new()
        .with_binary(&cli)
        .with_output_writer(buffer.clone())
        .with_error_writer(buffer.clone());
    set_tanzu_context_active_resource("test-context", "projectA", "", options).unwrap();

    assert_eq!(buffer.contents(), "then-out\nfirst-err\n");
}
