// SPDX-License-Identifier: Apache-2.0 OR MIT
fn main() {
    // The signal integration test is skipped under `cargo tarpaulin`, whose
    // ptrace-based runner intercepts SIGTERM. Declare the cfg so normal
    // builds do not warn about it.
    println!("cargo:rustc-check-cfg=cfg(tarpaulin)");
}
