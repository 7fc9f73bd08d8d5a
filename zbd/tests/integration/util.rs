use std::process::Command;

use assert_cmd::prelude::*;

pub fn zbd() -> Command {
    Command::cargo_bin("zbd").unwrap()
}
