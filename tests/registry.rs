mod common;

use std::thread;
use std::time::Duration;
use ddc_control::{Config, DisplayIdentifier, Error, IoPath, MccsVersion, Registry};
use common::{make_edid, FakeBackend, Monitor, SharedMonitor};

fn monitors() -> Vec<(u32, SharedMonitor)> {
    let dead = Monitor::new(make_edid("ACR", "DEAD", "SN3", 3));
    let mut no_edid = Monitor::new(Vec::new());
    no_edid.vcp.clear();

    vec![
        (3, Monitor::new(make_edid("DEL", "U2715H", "SN1", 1)).shared()),
        (4, Monitor { dead: true, ..dead }.shared()),
        (5, Monitor::new(make_edid("DEL", "P2419H", "SN2", 2)).shared()),
        (6, no_edid.shared()),
    ]
}

fn detected() -> Registry {
    let mut registry = common::registry(monitors(), None);
    assert_eq!(registry.detect(&common::session()).unwrap(), 2);
    registry
}

#[test]
fn detection() {
    let registry = detected();

    let valid = registry.display_info_list(false).unwrap();
    assert_eq!(valid.iter().map(|i| i.dispno).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(valid[0].path, IoPath::I2c { busno: 3 });
    assert_eq!(valid[0].model, "U2715H");
    assert_eq!(valid[1].serial, "SN2");
    assert_eq!(valid[0].mccs_version, MccsVersion::V21);

    let all = registry.display_info_list(true).unwrap();
    assert_eq!(all.len(), 3);
    let invalid = all.iter().find(|i| i.path == IoPath::I2c { busno: 4 }).unwrap();
    assert_eq!(invalid.dispno, -1);
    assert_eq!(invalid.mfg_id, "ACR");
}

#[test]
fn invalid_displays_can_be_dropped() {
    let config = Config::default()
        .with_udf_search_paths(Vec::new())
        .with_keep_invalid(false);
    let mut registry = Registry::with_backends(config, vec![std::sync::Arc::new(FakeBackend { monitors: monitors() })]);
    assert_eq!(registry.detect(&common::session()).unwrap(), 2);
    assert_eq!(registry.displays().len(), 2);
}

#[test]
fn before_detection() {
    let registry = common::registry(monitors(), None);
    assert!(!registry.is_detected());
    match registry.get_display_ref(&DisplayIdentifier::busno(3)) {
        Err(Error::Uninitialized) => (),
        r => panic!("unexpected {:?}", r.map(|d| d.to_string())),
    }
    assert!(registry.display_info_list(true).is_err());
}

#[test]
fn lookup() {
    let registry = detected();

    let dref = registry.get_display_ref(&DisplayIdentifier::busno(5)).unwrap();
    assert_eq!(dref.dispno(), 2);
    assert_eq!(registry.get_display_ref(&DisplayIdentifier::dispno(2).unwrap()).unwrap(), dref);

    let by_model = DisplayIdentifier::mfg_model_sn(None, Some("U2715H"), None).unwrap();
    assert_eq!(registry.get_display_ref(&by_model).unwrap().dispno(), 1);

    let by_edid = DisplayIdentifier::edid(&dref.edid().unwrap().bytes).unwrap();
    assert_eq!(registry.get_display_ref(&by_edid).unwrap(), dref);

    let by_mfg = DisplayIdentifier::mfg_model_sn(Some("DEL"), None, Some("")).unwrap();
    match registry.get_display_ref(&by_mfg) {
        Err(Error::AmbiguousDisplay(2)) => (),
        r => panic!("unexpected {:?}", r.map(|d| d.to_string())),
    }

    match registry.get_display_ref(&DisplayIdentifier::busno(9)) {
        Err(Error::DisplayNotFound) => (),
        r => panic!("unexpected {:?}", r.map(|d| d.to_string())),
    }
}

#[test]
fn exclusive_handles() {
    let registry = detected();
    let dref = registry.get_display_ref(&DisplayIdentifier::busno(3)).unwrap();

    let handle = registry.open_display(&dref, false).unwrap();
    assert!(dref.is_open());
    match registry.open_display(&dref, false) {
        Err(Error::Locked) => (),
        r => panic!("unexpected {:?}", r),
    }
    match registry.open_display_timeout(&dref, Duration::from_millis(20)) {
        Err(Error::Locked) => (),
        r => panic!("unexpected {:?}", r),
    }

    thread::scope(|s| {
        let waiter = s.spawn(|| registry.open_display(&dref, true).map(drop));
        thread::sleep(Duration::from_millis(50));
        drop(handle);
        waiter.join().unwrap().unwrap();
    });

    assert!(!dref.is_open());
    registry.open_display(&dref, false).unwrap().close().unwrap();
}

#[test]
fn transport_closed_before_release() {
    let monitors = monitors();
    let monitor = monitors[0].1.clone();
    let mut registry = common::registry(monitors, None);
    registry.detect(&common::session()).unwrap();
    let dref = registry.get_display_ref(&DisplayIdentifier::busno(3)).unwrap();
    monitor.lock().peak_transports = 0;

    let handle = registry.open_display(&dref, false).unwrap();
    assert_eq!(monitor.lock().transports, 1);

    thread::scope(|s| {
        let waiter = s.spawn(|| registry.open_display(&dref, true).map(drop));
        thread::sleep(Duration::from_millis(50));
        drop(handle);
        waiter.join().unwrap().unwrap();
    });

    let monitor = monitor.lock();
    assert_eq!(monitor.transports, 0);
    assert_eq!(monitor.peak_transports, 1);
}

#[test]
fn redetection() {
    let mut registry = detected();
    let session = common::session();
    let old = registry.get_display_ref(&DisplayIdentifier::busno(3)).unwrap();

    let handle = registry.open_display(&old, false).unwrap();
    match registry.detect(&session) {
        Err(Error::InvalidOperation(..)) => (),
        r => panic!("unexpected {:?}", r),
    }
    drop(handle);

    assert_eq!(registry.detect(&session).unwrap(), 2);
    assert!(old.is_removed());
    match registry.open_display(&old, false) {
        Err(Error::DisplayRemoved) => (),
        r => panic!("unexpected {:?}", r),
    }

    let new = registry.get_display_ref(&DisplayIdentifier::busno(3)).unwrap();
    assert!(new != old && !new.is_removed());
}

#[test]
fn usb_detection_toggle() {
    let mut registry = common::registry(monitors(), None);
    registry.enable_usb_display_detection(false).unwrap();
    assert!(!registry.is_usb_display_detection_enabled());
    match registry.enable_usb_display_detection(true) {
        Err(Error::Unimplemented(..)) => (),
        r => panic!("unexpected {:?}", r),
    }

    registry.detect(&common::session()).unwrap();
    match registry.enable_usb_display_detection(false) {
        Err(Error::InvalidOperation(..)) => (),
        r => panic!("unexpected {:?}", r),
    }
}
