use atelier::config::{Config, DEFAULT_ASSIGN_RETRIES};
use atelier::store::DEFAULT_EVENT_LIMIT;
use atelier::model::StageId;
use std::io::Write;

// Environment variables are process-wide, so every case runs in one test.
#[test]
fn config_from_env() {
    unsafe {
        std::env::remove_var("ATELIER_STORE");
        std::env::remove_var("ATELIER_DEPARTMENTS");
        std::env::remove_var("ATELIER_ATTENDANCE");
        std::env::remove_var("ATELIER_ASSIGN_RETRIES");
        std::env::remove_var("ATELIER_EVENT_LIMIT");
    }
    assert!(Config::from_env().is_err(), "ATELIER_STORE is required");

    unsafe {
        std::env::set_var("ATELIER_STORE", "/tmp/atelier-test/floor.json");
    }
    let config = Config::from_env().unwrap();
    assert_eq!(config.store_path.to_str(), Some("/tmp/atelier-test/floor.json"));
    assert_eq!(config.assign_retries, DEFAULT_ASSIGN_RETRIES);
    assert_eq!(config.event_limit, DEFAULT_EVENT_LIMIT);
    assert!(config.departments_path.is_none());
    assert!(config.attendance().unwrap().is_none());
    assert!(!config.log_level.is_empty());
    assert_eq!(config.departments().unwrap().stage_for("sewing").unwrap(), StageId::Sewing);

    unsafe {
        std::env::set_var("ATELIER_ASSIGN_RETRIES", "5");
    }
    assert_eq!(Config::from_env().unwrap().assign_retries, 5);

    for bad in ["0", "-1", "many"] {
        unsafe {
            std::env::set_var("ATELIER_ASSIGN_RETRIES", bad);
        }
        assert!(Config::from_env().is_err(), "{bad} should be rejected");
    }

    unsafe {
        std::env::remove_var("ATELIER_ASSIGN_RETRIES");
        std::env::set_var("ATELIER_EVENT_LIMIT", "500");
    }
    assert_eq!(Config::from_env().unwrap().event_limit, 500);
    unsafe {
        std::env::set_var("ATELIER_EVENT_LIMIT", "0");
    }
    assert!(Config::from_env().is_err(), "an event limit of 0 should be rejected");
    unsafe {
        std::env::remove_var("ATELIER_EVENT_LIMIT");
    }

    let mut departments = tempfile::NamedTempFile::new().unwrap();
    writeln!(departments, "[[department]]\nname = \"Tailoring\"\nstage = \"sewing\"").unwrap();
    unsafe {
        std::env::remove_var("ATELIER_ASSIGN_RETRIES");
        std::env::set_var("ATELIER_DEPARTMENTS", departments.path());
    }
    let map = Config::from_env().unwrap().departments().unwrap();
    assert_eq!(map.stage_for("tailoring").unwrap(), StageId::Sewing);
    assert!(map.stage_for("sewing").is_err());

    unsafe {
        std::env::set_var("ATELIER_DEPARTMENTS", "");
    }
    assert!(Config::from_env().unwrap().departments_path.is_none());

    unsafe {
        std::env::remove_var("ATELIER_STORE");
        std::env::remove_var("ATELIER_DEPARTMENTS");
    }
}
