// Flag sets reporting to the process-wide aggregator
use emergency_core::{global, global_indicator, DependencyTable, EmergencyIndicator, FlagSet};
use std::sync::Arc;

// Single test: the process-wide aggregator can only be initialized once.
#[test]
fn test_flag_sets_drive_global_indicator() {
    let aggregator = global();
    assert!(Arc::ptr_eq(&aggregator, &global()));
    aggregator.init_once().expect("first initialization");
    assert!(global().init_once().is_err());

    let deps = Arc::new(DependencyTable::empty());
    let mut motor = FlagSet::new(global(), Arc::clone(&deps));
    let mut sensor = FlagSet::new(global(), deps);
    assert!(Arc::ptr_eq(motor.aggregator(), &aggregator));
    assert!(!global_indicator().is_asserted());

    motor.raise(3).unwrap();
    assert!(global_indicator().is_asserted());
    assert!(sensor.is_emergency_active());
    assert_eq!(global().read_count(), 1);

    sensor.raise(7).unwrap();
    assert_eq!(global().read_count(), 2);

    motor.solve(3).unwrap();
    assert!(global_indicator().is_asserted());

    drop(sensor);
    assert_eq!(global().read_count(), 0);
    assert!(!global_indicator().is_asserted());
    assert!(!motor.is_emergency_active());
}
