use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use smu::{GroupConfiguration, InstrumentGroup, Registry, SocketTransport, Submodule};

fn main() -> smu::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (address, config_path) = match (args.next(), args.next()) {
        (Some(address), Some(config_path)) => (address, config_path),
        _ => {
            eprintln!("usage: smu-spot <host:port> <group.json>");
            std::process::exit(2)
        }
    };

    let config = GroupConfiguration::from_json(&std::fs::read_to_string(&config_path)?)?;
    let transport = SocketTransport::connect(address.as_str(), Some(Duration::from_secs(5)))?;
    let mut group = InstrumentGroup::from_config(
        config_path.as_str(), &config, &Registry::with_defaults(), Rc::new(RefCell::new(transport)))?;
    println!("{}", group);

    for (name, submodule) in group.submodules() {
        match submodule {
            Submodule::Smu(smu) => {
                smu.force_voltage(0.0)?;
                let measurement = smu.measure(smu::Quantity::Current)?;
                println!("{:>12} ({:?}): {:+e} A [{:?}]",
                         name, smu.channel(), measurement.value, measurement.status);
            }
        }
    }
    Ok(())
}
