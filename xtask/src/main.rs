// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::process::Command as StdCommand;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
struct Command {
    #[command(subcommand)]
    sub: SubCommand,
}

impl Command {
    fn run(self) {
        match self.sub {
            SubCommand::Build => run_build(),
            SubCommand::Lint { fix } => run_lint(fix),
            SubCommand::Test { no_capture } => run_test(no_capture),
        }
    }
}

#[derive(Subcommand)]
enum SubCommand {
    #[command(about = "Compile workspace packages.")]
    Build,
    #[command(about = "Run format and clippy checks.")]
    Lint {
        #[arg(long, help = "Automatically apply lint suggestions.")]
        fix: bool,
    },
    #[command(about = "Run unit tests.")]
    Test {
        #[arg(long, help = "Run tests serially and do not capture output.")]
        no_capture: bool,
    },
}

fn main() {
    let cmd = Command::parse();
    cmd.run()
}

fn cargo() -> StdCommand {
    let cargo = which::which("cargo").expect("cargo not found in PATH");
    StdCommand::new(cargo)
}

fn execute(mut cmd: StdCommand) {
    let status = cmd.status().expect("failed to execute command");
    assert!(status.success(), "command failed: {status}");
}

fn run_build() {
    let mut cmd = cargo();
    cmd.args(["build", "--workspace", "--all-features"]);
    execute(cmd);
}

fn run_test(no_capture: bool) {
    let mut cmd = cargo();
    cmd.args(["test", "--workspace", "--all-features"]);
    if no_capture {
        cmd.args(["--", "--nocapture", "--test-threads=1"]);
    }
    execute(cmd);
}

fn run_lint(fix: bool) {
    let mut fmt = cargo();
    fmt.args(["fmt", "--all"]);
    if !fix {
        fmt.arg("--check");
    }
    execute(fmt);

    let mut clippy = cargo();
    clippy.args(["clippy", "--workspace", "--all-targets", "--all-features"]);
    if fix {
        clippy.args(["--allow-staged", "--allow-dirty", "--fix"]);
    } else {
        clippy.args(["--", "-D", "warnings"]);
    }
    execute(clippy);
}
