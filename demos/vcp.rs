use std::env::args;
use ddc_control::{Config, DisplayIdentifier, Registry, Session};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let busno = args().nth(1).map(|n| n.parse().expect("argument: i2c bus number"));

    let session = Session::new();
    let mut registry = Registry::new(Config::default());
    registry.detect(&session).expect("failed to detect displays");

    let id = match busno {
        Some(busno) => DisplayIdentifier::busno(busno),
        None => DisplayIdentifier::dispno(1).expect("invalid display number"),
    };
    let dref = registry.get_display_ref(&id).expect("display not found");
    let mut handle = registry.open_display(&dref, true).expect("failed to open display");

    let mccs_ver = handle.mccs_version(&session).expect("failed to read MCCS version");
    println!("MCCS version is {}", mccs_ver);

    let input = handle.get_non_table_vcp_value(&session, 0x60).expect("failed to read VCP value");
    let metadata = handle.feature_metadata(&session, 0x60, true).expect("no metadata for input source");
    match metadata.value_name(input.sl) {
        Ok(name) => println!("input is {} ({:02x})", name, input.sl),
        Err(..) => println!("input is {:?}", input),
    }
}
