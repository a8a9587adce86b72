//! Groups of channels built from configuration through a registry of driver constructors.

use std::collections::BTreeMap;
use std::fmt;

use crate::{Error, Result, Transport};
use crate::config::GroupConfiguration;
use crate::params::ChannelNumber;
use crate::smu::Smu;

/// A driver instance owned by a group.
#[derive(Debug)]
pub enum Submodule<T: Transport> {
    Smu(Smu<T>),
}

impl<T: Transport> Submodule<T> {
    pub fn as_smu(&mut self) -> Option<&mut Smu<T>> {
        match self {
            Self::Smu(smu) => Some(smu),
        }
    }
}

pub type Constructor<T> = fn(ChannelNumber, T) -> Submodule<T>;

/// Maps driver identifiers used in configuration to constructors.
pub struct Registry<T: Transport> {
    constructors: BTreeMap<String, Constructor<T>>,
}

impl<T: Transport> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

impl<T: Transport> Default for Registry<T> {
    fn default() -> Self {
        Registry { constructors: BTreeMap::new() }
    }
}

impl<T: Transport> Registry<T> {
    /// Registry with the built-in SMU models.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register("B1517A", smu_constructor);
        registry.register("B1511B", smu_constructor);
        registry
    }

    /// Register `constructor` under `driver`, replacing any previous registration.
    pub fn register(&mut self, driver: impl Into<String>, constructor: Constructor<T>) {
        self.constructors.insert(driver.into(), constructor);
    }

    pub fn construct(&self, driver: &str, channel: ChannelNumber, transport: T) -> Result<Submodule<T>> {
        let constructor = self.constructors.get(driver)
            .ok_or_else(|| Error::UnknownDriver(driver.to_owned()))?;
        log::debug!("construct({:?}, {:?})", driver, channel);
        Ok(constructor(channel, transport))
    }
}

fn smu_constructor<T: Transport>(channel: ChannelNumber, transport: T) -> Submodule<T> {
    Submodule::Smu(Smu::new(transport, channel))
}

/// Named drivers sharing one instrument connection.
#[derive(Debug)]
pub struct InstrumentGroup<T: Transport> {
    name: String,
    submodules: BTreeMap<String, Submodule<T>>,
}

impl<T: Transport + Clone> InstrumentGroup<T> {
    /// Build every configured submodule with a clone of `transport`.
    ///
    /// Nothing is sent unless `set_initial_values_on_load` is set, in which case each submodule
    /// with initial values receives them right after construction.
    pub fn from_config(name: impl Into<String>, config: &GroupConfiguration, registry: &Registry<T>,
                       transport: T) -> Result<InstrumentGroup<T>> {
        let name = name.into();
        for submodule_name in config.initial_values.keys() {
            if !config.submodules.contains_key(submodule_name) {
                log::warn!("group {:?}: initial values for unknown submodule {:?}", name, submodule_name);
            }
        }

        let mut submodules = BTreeMap::new();
        for (submodule_name, submodule_config) in &config.submodules {
            let mut submodule = registry.construct(
                &submodule_config.driver, submodule_config.channel, transport.clone())?;
            if config.set_initial_values_on_load {
                if let Some(initial) = config.initial_values.get(submodule_name) {
                    match &mut submodule {
                        Submodule::Smu(smu) => smu.apply(initial)?,
                    }
                }
            }
            submodules.insert(submodule_name.clone(), submodule);
        }
        Ok(InstrumentGroup { name, submodules })
    }
}

impl<T: Transport> InstrumentGroup<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&mut self, name: &str) -> Option<&mut Submodule<T>> {
        self.submodules.get_mut(name)
    }

    pub fn smu(&mut self, name: &str) -> Option<&mut Smu<T>> {
        self.get(name).and_then(Submodule::as_smu)
    }

    pub fn submodules(&mut self) -> impl Iterator<Item = (&str, &mut Submodule<T>)> {
        self.submodules.iter_mut().map(|(name, submodule)| (name.as_str(), submodule))
    }
}

impl<T: Transport> fmt::Display for InstrumentGroup<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names = self.submodules.keys().map(String::as_str).collect::<Vec<_>>();
        write!(f, "InstrumentGroup(name={}, submodules={})", self.name, names.join(", "))
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::LoopbackTransport;

    type Shared = Rc<RefCell<LoopbackTransport>>;

    const CONFIG: &str = r#"{
        "submodules": {
            "gate": { "type": "B1517A", "channel": 1 },
            "drain": { "type": "B1511B", "channel": 202 }
        },
        "initial_values": {
            "gate": { "adc_type": "HighResolution" },
            "drain": { "timing_parameters": { "hold": 0.0, "delay": 0.5, "count": 8, "step_delay": null } }
        },
        "set_initial_values_on_load": true
    }"#;

    #[test]
    fn test_from_config() {
        let shared: Shared = Default::default();
        let config = GroupConfiguration::from_json(CONFIG).unwrap();
        let mut group = InstrumentGroup::from_config(
            "bench", &config, &Registry::with_defaults(), shared.clone()).unwrap();
        assert_eq!(group.to_string(), "InstrumentGroup(name=bench, submodules=drain, gate)");
        // submodules are built in name order
        assert_eq!(shared.borrow().written(), ["MT 0.0,0.5,8", "AAD 1,1"]);

        group.smu("drain").unwrap().force_current(1e-3).unwrap();
        group.smu("gate").unwrap().force_voltage(1.5).unwrap();
        assert_eq!(shared.borrow().written()[2..], ["DI 202,0,0.001", "DV 1,0,1.5"]);
        assert_eq!(group.smu("gate").unwrap().channel(), ChannelNumber::slot(1).unwrap());
        assert!(group.smu("source").is_none());
    }

    #[test]
    fn test_initial_values_not_applied() {
        let shared: Shared = Default::default();
        let mut config = GroupConfiguration::from_json(CONFIG).unwrap();
        config.set_initial_values_on_load = false;
        let group = InstrumentGroup::from_config(
            "bench", &config, &Registry::with_defaults(), shared.clone()).unwrap();
        assert_eq!(group.name(), "bench");
        assert!(shared.borrow().written().is_empty());
    }

    #[test]
    fn test_unknown_driver() {
        let shared: Shared = Default::default();
        let config = GroupConfiguration::from_json(r#"{
            "submodules": { "scope": { "type": "DSOX1204G", "channel": 1 } }
        }"#).unwrap();
        let result = InstrumentGroup::from_config("bench", &config, &Registry::with_defaults(), shared);
        assert!(matches!(result, Err(Error::UnknownDriver(driver)) if driver == "DSOX1204G"));
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = Registry::<LoopbackTransport>::default();
        assert!(registry.construct("B1517A", ChannelNumber::slot(1).unwrap(),
                                   LoopbackTransport::new()).is_err());
        registry.register("smu", |channel, transport| Submodule::Smu(Smu::new(transport, channel)));
        let mut submodule = registry.construct("smu", ChannelNumber::slot(5).unwrap(),
                                               LoopbackTransport::new()).unwrap();
        let smu = submodule.as_smu().unwrap();
        smu.use_high_speed_adc().unwrap();
        assert_eq!(smu.transport().written(), ["AAD 5,0"]);
    }
}
