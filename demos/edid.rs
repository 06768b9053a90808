use ddc_control::{Config, EdidInfo, Registry, Session};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let session = Session::new();
    let mut registry = Registry::new(Config::default());
    registry.detect(&session).expect("failed to detect displays");

    for info in registry.display_info_list(true).expect("failed to list displays") {
        println!("Display {} on {}", info.dispno, info.path);
        match info.edid {
            Some(ref bytes) => match EdidInfo::parse(bytes) {
                Ok(edid) => {
                    println!("  Mfg id:       {}", edid.mfg_id);
                    println!("  Model:        {}", edid.model);
                    println!("  Serial:       {}", edid.serial);
                    println!("  Product code: {}", edid.product_code);
                },
                Err(e) => println!("  Failure: {}", e),
            },
            None => println!("  No EDID"),
        }
        println!("  MCCS version: {}", info.mccs_version);
    }
}
