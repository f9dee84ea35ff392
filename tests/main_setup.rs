use minornote::{AppConfig, config::Env};
use serial_test::serial;
use std::{env, panic};

// --- Setup/Teardown Utilities ---

/// Runs a test closure and restores the named environment variables after,
/// whether or not the closure panicked.
fn run_with_env<T, R>(test: T, cleanup_vars: Vec<&'static str>) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(String, Option<String>)> = cleanup_vars
        .iter()
        .map(|&var| (var.to_string(), env::var(var).ok()))
        .collect();

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(&key, val);
            } else {
                env::remove_var(&key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn production_config_fails_fast_on_missing_secrets() {
    let result = panic::catch_unwind(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("DATABASE_URL", "sqlite:prod.db");
            // JWT_SECRET is deliberately missing.
            env::remove_var("JWT_SECRET");
        }
        AppConfig::load()
    });

    unsafe {
        for var in ["APP_ENV", "DATABASE_URL", "JWT_SECRET"] {
            env::remove_var(var);
        }
    }

    assert!(
        result.is_err(),
        "Production config loading should panic on a missing JWT_SECRET"
    );
}

#[test]
#[serial]
fn production_config_loads_when_fully_specified() {
    let config = run_with_env(
        || {
            unsafe {
                env::set_var("APP_ENV", "production");
                env::set_var("DATABASE_URL", "sqlite:prod.db");
                env::set_var("JWT_SECRET", "a-real-secret");
            }
            AppConfig::load()
        },
        vec!["APP_ENV", "DATABASE_URL", "JWT_SECRET"],
    );

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.db_url, "sqlite:prod.db");
    assert_eq!(config.jwt_secret, "a-real-secret");
}

#[test]
#[serial]
fn local_config_falls_back_to_defaults() {
    let config = run_with_env(
        || {
            unsafe {
                env::set_var("APP_ENV", "local");
                // Clear everything else to exercise the fallbacks.
                env::remove_var("DATABASE_URL");
                env::remove_var("JWT_SECRET");
            }
            AppConfig::load()
        },
        vec!["APP_ENV", "DATABASE_URL", "JWT_SECRET"],
    );

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.db_url, "sqlite:minornote.db");
    assert_eq!(config.jwt_secret, "minornote-local-test-secret");
}

#[test]
#[serial]
fn unset_app_env_means_local() {
    let config = run_with_env(
        || {
            unsafe {
                env::remove_var("APP_ENV");
                env::remove_var("DATABASE_URL");
                env::remove_var("JWT_SECRET");
            }
            AppConfig::load()
        },
        vec!["APP_ENV", "DATABASE_URL", "JWT_SECRET"],
    );

    assert_eq!(config.env, Env::Local);
}
