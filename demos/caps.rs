use std::env::args;
use ddc_control::{Config, DisplayIdentifier, Registry, Session};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let dispno = args().nth(1).map(|n| n.parse().expect("argument: display number")).unwrap_or(1);

    let session = Session::new();
    let mut registry = Registry::new(Config::default());
    registry.detect(&session).expect("failed to detect displays");

    let id = DisplayIdentifier::dispno(dispno).expect("invalid display number");
    let dref = registry.get_display_ref(&id).expect("display not found");
    let mut handle = registry.open_display(&dref, true).expect("failed to open display");

    let caps = handle.parsed_capabilities(&session).expect("failed to read capabilities");
    println!("got CAPS: {}", caps.unparsed);
    println!("MCCS version: {}", caps.version);
    for feature in &caps.features {
        let name = handle.feature_metadata(&session, feature.code, true)
            .map(|m| m.name.into_owned())
            .unwrap_or_default();
        match feature.values {
            Some(ref values) => println!("  {:02X} {}: {:02X?}", feature.code, name, values),
            None => println!("  {:02X} {}", feature.code, name),
        }
    }
    for message in &caps.messages {
        println!("warning: {}", message);
    }
}
