//! Integration tests for the catalog database layer.
//!
//! These use an in-memory SQLite database with the full migration set.

use thermolog::db::Database;
use thermolog::error::LookupError;
use thermolog::types::{Reading, SensorKind};

/// Helper to create a fresh in-memory database for testing.
fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn accuweather(loc_code: &str) -> SensorKind {
    SensorKind::Accuweather {
        loc_code: loc_code.to_string(),
    }
}

fn w1therm(family: i64, hardware_id: &str) -> SensorKind {
    SensorKind::W1Therm {
        family,
        hardware_id: hardware_id.to_string(),
    }
}

mod group_tests {
    use super::*;

    #[test]
    fn add_group_assigns_id_and_round_trips() {
        let db = setup_db();

        let group = db.add_group("Outdoor", Some("Backyard")).unwrap();
        assert!(group.id > 0);

        let fetched = db.get_group(group.id).unwrap();
        assert_eq!(fetched.name, "Outdoor");
        assert_eq!(fetched.description.as_deref(), Some("Backyard"));
    }

    #[test]
    fn add_group_rejects_long_name() {
        let db = setup_db();
        let result = db.add_group(&"x".repeat(33), None);
        assert!(result.is_err());
    }

    #[test]
    fn add_group_rejects_long_description() {
        let db = setup_db();
        let result = db.add_group("ok", Some(&"x".repeat(101)));
        assert!(result.is_err());
    }

    #[test]
    fn get_group_zero_rows_is_not_found() {
        let db = setup_db();

        let err = db.get_group(42).unwrap_err();
        let lookup = err.downcast::<LookupError>().unwrap();
        assert!(matches!(lookup, LookupError::NotFound { kind: "group", id: 42 }));
    }

    #[test]
    fn list_groups_is_ordered_by_id() {
        let db = setup_db();
        db.add_group("A", None).unwrap();
        db.add_group("B", None).unwrap();

        let names: Vec<String> = db.list_groups().unwrap().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}

mod sensor_tests {
    use super::*;

    #[test]
    fn add_sensor_without_name_uses_variant_default() {
        let db = setup_db();

        let remote = db.add_sensor(None, None, None, accuweather("10001")).unwrap();
        assert_eq!(remote.name, "Accuweather 10001");

        let local = db
            .add_sensor(None, None, None, w1therm(0x28, "0000051f4b2f"))
            .unwrap();
        assert_eq!(local.name, "W1Therm 0000051f4b2f");
    }

    #[test]
    fn add_sensor_with_explicit_name_keeps_it() {
        let db = setup_db();

        let sensor = db
            .add_sensor(Some("Porch"), Some("By the door"), None, accuweather("10001"))
            .unwrap();
        assert_eq!(sensor.name, "Porch");
        assert_eq!(sensor.description.as_deref(), Some("By the door"));
    }

    #[test]
    fn sensor_round_trips_kind_through_extension_tables() {
        let db = setup_db();

        let remote = db.add_sensor(None, None, None, accuweather("10001")).unwrap();
        let local = db
            .add_sensor(None, None, None, w1therm(0x28, "0000051f4b2f"))
            .unwrap();

        assert_eq!(db.get_sensor(remote.id).unwrap().kind, accuweather("10001"));
        assert_eq!(
            db.get_sensor(local.id).unwrap().kind,
            w1therm(0x28, "0000051f4b2f")
        );
    }

    #[test]
    fn add_sensor_rejects_unknown_group() {
        let db = setup_db();

        let err = db
            .add_sensor(None, None, Some(999), accuweather("10001"))
            .unwrap_err();
        let lookup = err.downcast::<LookupError>().unwrap();
        assert!(matches!(lookup, LookupError::NotFound { kind: "group", .. }));
    }

    #[test]
    fn add_sensor_rejects_long_loc_code_and_hardware_id() {
        let db = setup_db();

        assert!(db.add_sensor(None, None, None, accuweather(&"9".repeat(11))).is_err());
        assert!(
            db.add_sensor(None, None, None, w1therm(0x28, &"a".repeat(17)))
                .is_err()
        );
    }

    #[test]
    fn get_sensor_zero_rows_is_not_found() {
        let db = setup_db();

        let err = db.get_sensor(7).unwrap_err();
        let lookup = err.downcast::<LookupError>().unwrap();
        assert!(matches!(lookup, LookupError::NotFound { kind: "sensor", id: 7 }));
    }

    #[test]
    fn grouped_and_ungrouped_listings() {
        let db = setup_db();
        let group = db.add_group("Outdoor", None).unwrap();

        let in_group = db
            .add_sensor(None, None, Some(group.id), accuweather("10001"))
            .unwrap();
        let loose = db.add_sensor(None, None, None, w1therm(0x28, "abc")).unwrap();

        let grouped = db.sensors_in_group(group.id).unwrap();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].id, in_group.id);

        let ungrouped = db.ungrouped_sensors().unwrap();
        assert_eq!(ungrouped.len(), 1);
        assert_eq!(ungrouped[0].id, loose.id);
    }

    #[test]
    fn regroup_moves_sensor_between_groups() {
        let db = setup_db();
        let a = db.add_group("A", None).unwrap();
        let b = db.add_group("B", None).unwrap();
        let sensor = db
            .add_sensor(None, None, Some(a.id), accuweather("10001"))
            .unwrap();

        let moved = db.set_sensor_group(sensor.id, Some(b.id)).unwrap();
        assert_eq!(moved.group_id, Some(b.id));

        assert!(db.sensors_in_group(a.id).unwrap().is_empty());
        assert_eq!(db.sensors_in_group(b.id).unwrap().len(), 1);
    }

    #[test]
    fn regroup_to_none_clears_the_reference() {
        let db = setup_db();
        let a = db.add_group("A", None).unwrap();
        let sensor = db
            .add_sensor(None, None, Some(a.id), accuweather("10001"))
            .unwrap();

        let cleared = db.set_sensor_group(sensor.id, None).unwrap();
        assert_eq!(cleared.group_id, None);
        assert_eq!(db.ungrouped_sensors().unwrap().len(), 1);
    }

    #[test]
    fn regroup_rejects_missing_sensor_or_group() {
        let db = setup_db();
        let group = db.add_group("A", None).unwrap();

        assert!(db.set_sensor_group(99, Some(group.id)).is_err());

        let sensor = db.add_sensor(None, None, None, accuweather("10001")).unwrap();
        assert!(db.set_sensor_group(sensor.id, Some(99)).is_err());
    }
}

mod reading_tests {
    use super::*;

    #[test]
    fn insert_reading_assigns_id() {
        let db = setup_db();
        let sensor = db.add_sensor(None, None, None, accuweather("10001")).unwrap();

        let transient = Reading::new(sensor.id, 1_700_000_000_000, 72.0);
        assert!(transient.id.is_none());

        let saved = db.insert_reading(&transient).unwrap();
        assert!(saved.id.is_some());
        assert_eq!(saved.value, 72.0);
    }

    #[test]
    fn insert_reading_rejects_already_persisted() {
        let db = setup_db();
        let sensor = db.add_sensor(None, None, None, accuweather("10001")).unwrap();

        let saved = db
            .insert_reading(&Reading::new(sensor.id, 1, 70.0))
            .unwrap();
        assert!(db.insert_reading(&saved).is_err());
    }

    #[test]
    fn insert_reading_rejects_unknown_sensor() {
        let db = setup_db();
        let err = db.insert_reading(&Reading::new(404, 1, 70.0)).unwrap_err();
        let lookup = err.downcast::<LookupError>().unwrap();
        assert!(matches!(lookup, LookupError::NotFound { kind: "sensor", .. }));
    }

    #[test]
    fn readings_enumerate_newest_first() {
        let db = setup_db();
        let sensor = db.add_sensor(None, None, None, accuweather("10001")).unwrap();

        for (time_ms, value) in [(100, 60.0), (300, 62.0), (200, 61.0)] {
            db.insert_reading(&Reading::new(sensor.id, time_ms, value))
                .unwrap();
        }

        let times: Vec<i64> = db
            .readings_for_sensor(sensor.id)
            .unwrap()
            .into_iter()
            .map(|r| r.time_ms)
            .collect();
        assert_eq!(times, vec![300, 200, 100]);
    }
}

mod end_to_end_tests {
    use super::*;

    /// Add a group and an unnamed Accuweather sensor; the group listing shows
    /// the derived default name.
    #[test]
    fn group_listing_shows_derived_sensor_name() {
        let db = setup_db();

        let group = db.add_group("Outdoor", Some("Backyard")).unwrap();
        db.add_sensor(None, None, Some(group.id), accuweather("10001"))
            .unwrap();

        let groups = db.list_groups().unwrap();
        assert_eq!(groups.len(), 1);
        let sensors = db.sensors_in_group(groups[0].id).unwrap();
        assert_eq!(sensors.len(), 1);
        assert_eq!(sensors[0].name, "Accuweather 10001");
    }

    /// Reassigning a sensor is reflected in subsequent listings and the
    /// sensor no longer appears under its old group.
    #[test]
    fn regroup_is_reflected_in_listings() {
        let db = setup_db();
        let a = db.add_group("A", None).unwrap();
        let b = db.add_group("B", None).unwrap();
        let sensor = db
            .add_sensor(None, None, Some(a.id), w1therm(0x28, "abc"))
            .unwrap();

        db.set_sensor_group(sensor.id, Some(b.id)).unwrap();

        let in_a: Vec<i64> = db.sensors_in_group(a.id).unwrap().iter().map(|s| s.id).collect();
        let in_b: Vec<i64> = db.sensors_in_group(b.id).unwrap().iter().map(|s| s.id).collect();
        assert!(in_a.is_empty());
        assert_eq!(in_b, vec![sensor.id]);
    }
}
