use std::path::Path;
use std::sync::Arc;

use baton_plugin::EntryPoint;
use baton_plugin::test_utils::{
    BROKEN_ID, PASSTHROUGH_CLASSES, PASSTHROUGH_DESCRIPTOR, PASSTHROUGH_ID, TEST_CLASSES,
};
use baton_protocol::descriptor::Descriptor;
use baton_protocol::{Entry, Host, HostInfo, Plugin, ProtocolVersion, VERSION};

use super::{LoadError, Module};
use crate::Session;

fn host() -> Arc<dyn Host> {
    Session::new("Module Tests", "Baton Project", "https://host.test", "0.0.0").into_host()
}

/// An entry whose only class was built against a protocol version this
/// host does not speak.
struct StaleEntry;

impl Entry for StaleEntry {
    fn init(&self, _plugin_path: &Path) {}

    fn deinit(&self) {}

    fn plugin_count(&self) -> usize {
        1
    }

    fn plugin_descriptor(&self, _host: &HostInfo, index: usize) -> Option<Descriptor> {
        (index == 0).then(|| {
            let mut descriptor = Descriptor::from(PASSTHROUGH_DESCRIPTOR);
            descriptor.protocol_version = ProtocolVersion::new(VERSION.get() + 1);
            descriptor
        })
    }

    fn create_plugin(&self, _host: Arc<dyn Host>, _id: &str) -> Option<Box<dyn Plugin>> {
        panic!("create_plugin must not run when the version pre-check fails")
    }
}

/// An entry that lists a valid class but declines to create it.
struct RecluseEntry;

impl Entry for RecluseEntry {
    fn init(&self, _plugin_path: &Path) {}

    fn deinit(&self) {}

    fn plugin_count(&self) -> usize {
        1
    }

    fn plugin_descriptor(&self, _host: &HostInfo, index: usize) -> Option<Descriptor> {
        (index == 0).then(|| Descriptor::from(PASSTHROUGH_DESCRIPTOR))
    }

    fn create_plugin(&self, _host: Arc<dyn Host>, _id: &str) -> Option<Box<dyn Plugin>> {
        None
    }
}

#[test]
fn lists_every_class_in_table_order() {
    static ENTRY: EntryPoint = EntryPoint::new(&TEST_CLASSES);
    let module = Module::open(&ENTRY, host(), Path::new("/tmp/test.baton"));
    assert_eq!(module.plugin_count(), 2);
    let ids: Vec<String> = module.descriptors().map(|descriptor| descriptor.id).collect();
    assert_eq!(ids, [PASSTHROUGH_ID, BROKEN_ID]);
}

#[test]
fn creates_instances_by_exact_id() {
    static ENTRY: EntryPoint = EntryPoint::new(&TEST_CLASSES);
    let module = Module::open(&ENTRY, host(), Path::new("/tmp/test.baton"));
    let instance = module.create(PASSTHROUGH_ID).unwrap();
    assert_eq!(instance.descriptor().id, PASSTHROUGH_ID);
}

#[test]
fn unknown_ids_are_not_found() {
    static ENTRY: EntryPoint = EntryPoint::new(&TEST_CLASSES);
    let module = Module::open(&ENTRY, host(), Path::new("/tmp/test.baton"));
    let error = module.create("test.absent").unwrap_err();
    assert_eq!(
        error,
        LoadError::NotFound {
            id: "test.absent".to_owned()
        }
    );
}

#[test]
fn version_mismatches_are_caught_before_the_entry_runs() {
    static ENTRY: StaleEntry = StaleEntry;
    let module = Module::open(&ENTRY, host(), Path::new("/tmp/stale.baton"));
    let error = module.create(PASSTHROUGH_ID).unwrap_err();
    assert_eq!(
        error,
        LoadError::IncompatibleVersion {
            id: PASSTHROUGH_ID.to_owned(),
            plugin: ProtocolVersion::new(VERSION.get() + 1),
            host: VERSION,
        }
    );
}

#[test]
fn declined_creation_is_rejected() {
    static ENTRY: RecluseEntry = RecluseEntry;
    let module = Module::open(&ENTRY, host(), Path::new("/tmp/recluse.baton"));
    let error = module.create(PASSTHROUGH_ID).unwrap_err();
    assert_eq!(
        error,
        LoadError::Rejected {
            id: PASSTHROUGH_ID.to_owned()
        }
    );
}

#[test]
fn dropping_the_module_closes_the_entry() {
    static ENTRY: EntryPoint = EntryPoint::new(&PASSTHROUGH_CLASSES);
    {
        let module = Module::open(&ENTRY, host(), Path::new("/tmp/test.baton"));
        assert_eq!(module.plugin_count(), 1);
    }
    assert_eq!(ENTRY.plugin_count(), 0);
}
