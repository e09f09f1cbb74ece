// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn clear_env() {
    std::env::remove_var("RECOVERY_DEBUG");
    std::env::remove_var("DEBUG");
    std::env::remove_var("DRYDOCK_ENV");
}

#[test]
#[serial(engine_env)]
fn recovery_debug_off_by_default() {
    clear_env();
    assert!(!recovery_debug_enabled());
}

#[test]
#[serial(engine_env)]
fn recovery_debug_via_dedicated_variable() {
    clear_env();
    std::env::set_var("RECOVERY_DEBUG", "true");
    assert!(recovery_debug_enabled());

    std::env::set_var("RECOVERY_DEBUG", "1");
    assert!(recovery_debug_enabled());

    std::env::set_var("RECOVERY_DEBUG", "no");
    assert!(!recovery_debug_enabled());
    clear_env();
}

#[test]
#[serial(engine_env)]
fn recovery_debug_via_debug_substring() {
    clear_env();
    std::env::set_var("DEBUG", "app:recovery,app:tools");
    assert!(recovery_debug_enabled());

    std::env::set_var("DEBUG", "app:tools");
    assert!(!recovery_debug_enabled());
    clear_env();
}

#[test]
#[serial(engine_env)]
fn environment_defaults_to_dev() {
    clear_env();
    assert_eq!(environment(), Environment::Dev);

    std::env::set_var("DRYDOCK_ENV", "main");
    assert_eq!(environment(), Environment::Main);

    std::env::set_var("DRYDOCK_ENV", "staging");
    assert_eq!(environment(), Environment::Dev);
    clear_env();
}
