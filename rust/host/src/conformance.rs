//! Black-box conformance checks for plug-in modules.
//!
//! The checks drive a module purely through its [`Entry`] surface and
//! compare what happens against what the contract promises, so they
//! work on any implementation, not just plug-ins built with
//! `baton_plugin`. Each check is behavioral; none inspects how the
//! module is put together.

use std::path::Path;
use std::sync::Arc;

use baton_protocol::descriptor::Descriptor;
use baton_protocol::extension::Capability;
use baton_protocol::{Entry, Host, HostInfo, ProtocolVersion};
use itertools::Itertools;
use serde::Serialize;


const UNKNOWN_PLUGIN_ID: &str = "baton.conformance.no-such-id";
const UNKNOWN_EXTENSION_ID: &str = "baton.conformance.unknown/0";

/// How one check ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// The module behaved as the contract promises.
    Pass,

    /// The module broke the contract, as described.
    Fail(String),
}

/// One named check and how it ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    /// The stable name of the check.
    pub name: &'static str,

    /// How the check ended.
    pub outcome: Outcome,
}

/// Every check of one validation run, in the order they ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    checks: Vec<Check>,
}

impl Report {
    /// Whether every check passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks
            .iter()
            .all(|check| check.outcome == Outcome::Pass)
    }

    /// The checks, in the order they ran.
    #[must_use]
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// The report as pretty-printed JSON, for logs and CI artifacts.
    ///
    /// # Errors
    ///
    /// Any [`serde_json::Error`] raised while serializing.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Run every conformance check against `entry`.
///
/// Initializes the entry, runs the checks in a fixed order and closes
/// the entry again. The entry must not be open anywhere else while
/// validation runs; the checks assume they own its module state.
#[must_use]
pub fn validate_entry(entry: &dyn Entry, host: &Arc<dyn Host>, path: &Path) -> Report {
    entry.init(path);
    let descriptors = collect(entry, host.info());
    let checks = vec![
        check(
            "descriptor-enumeration",
            enumeration(entry, host.info(), &descriptors),
        ),
        check(
            "descriptor-stability",
            stability(entry, host.info(), &descriptors),
        ),
        check("descriptor-id-uniqueness", uniqueness(&descriptors)),
        check("create-unknown-id", unknown_id(entry, host)),
        check("create-known-ids", known_ids(entry, host, &descriptors)),
        check("version-gate", version_gate(entry, host, &descriptors)),
        check(
            "activation-round-trip",
            activation(entry, host, &descriptors),
        ),
        check(
            "unknown-extension",
            unknown_extension(entry, host, &descriptors),
        ),
    ];
    entry.deinit();
    Report { checks }
}

fn check(name: &'static str, result: Result<(), String>) -> Check {
    Check {
        name,
        outcome: match result {
            Ok(()) => Outcome::Pass,
            Err(reason) => Outcome::Fail(reason),
        },
    }
}

fn collect(entry: &dyn Entry, host: &HostInfo) -> Vec<Option<Descriptor>> {
    (0..entry.plugin_count())
        .map(|index| entry.plugin_descriptor(host, index))
        .collect()
}

fn enumeration(
    entry: &dyn Entry,
    host: &HostInfo,
    descriptors: &[Option<Descriptor>],
) -> Result<(), String> {
    if descriptors.is_empty() {
        return Err("the module exposes no plug-ins".to_owned());
    }
    for (index, slot) in descriptors.iter().enumerate() {
        let Some(descriptor) = slot else {
            return Err(format!(
                "no descriptor came back for index {index}, below the published count"
            ));
        };
        if descriptor.id.is_empty() {
            return Err(format!("the descriptor at index {index} carries an empty id"));
        }
    }
    if entry.plugin_descriptor(host, descriptors.len()).is_some() {
        return Err(format!(
            "a descriptor came back for index {}, at the published count",
            descriptors.len()
        ));
    }
    Ok(())
}

fn stability(
    entry: &dyn Entry,
    host: &HostInfo,
    descriptors: &[Option<Descriptor>],
) -> Result<(), String> {
    if collect(entry, host) == descriptors {
        Ok(())
    } else {
        Err("repeating the enumeration changed the descriptors".to_owned())
    }
}

fn uniqueness(descriptors: &[Option<Descriptor>]) -> Result<(), String> {
    let duplicated = descriptors
        .iter()
        .flatten()
        .map(|descriptor| descriptor.id.as_str())
        .duplicates()
        .join(", ");
    if duplicated.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "descriptor ids are claimed more than once: {duplicated}"
        ))
    }
}

fn unknown_id(entry: &dyn Entry, host: &Arc<dyn Host>) -> Result<(), String> {
    if entry
        .create_plugin(Arc::clone(host), UNKNOWN_PLUGIN_ID)
        .is_some()
    {
        Err(format!(
            "the unknown id {UNKNOWN_PLUGIN_ID:?} created a plug-in"
        ))
    } else {
        Ok(())
    }
}

fn known_ids(
    entry: &dyn Entry,
    host: &Arc<dyn Host>,
    descriptors: &[Option<Descriptor>],
) -> Result<(), String> {
    // Vacuously true for an empty module; the enumeration check already
    // reports that case.
    for descriptor in descriptors.iter().flatten() {
        let Some(plugin) = entry.create_plugin(Arc::clone(host), &descriptor.id) else {
            return Err(format!(
                "the listed id {:?} did not create a plug-in",
                descriptor.id
            ));
        };
        let created = plugin.descriptor().id.to_owned();
        if created != descriptor.id {
            return Err(format!(
                "creating {:?} produced a plug-in describing itself as {created:?}",
                descriptor.id
            ));
        }
    }
    Ok(())
}

struct MismatchedHost {
    info: HostInfo,
}

impl Host for MismatchedHost {
    fn info(&self) -> &HostInfo {
        &self.info
    }

    fn extension(&self, _id: &str) -> Option<Capability<'_>> {
        None
    }
}

fn version_gate(
    entry: &dyn Entry,
    host: &Arc<dyn Host>,
    descriptors: &[Option<Descriptor>],
) -> Result<(), String> {
    let mut info = host.info().clone();
    info.protocol_version = ProtocolVersion::new(info.protocol_version.get().wrapping_add(1));
    let mismatched: Arc<dyn Host> = Arc::new(MismatchedHost { info });
    for descriptor in descriptors.iter().flatten() {
        if entry
            .create_plugin(Arc::clone(&mismatched), &descriptor.id)
            .is_some()
        {
            return Err(format!(
                "{:?} was created for a host with a mismatched protocol version",
                descriptor.id
            ));
        }
    }
    Ok(())
}

fn activation(
    entry: &dyn Entry,
    host: &Arc<dyn Host>,
    descriptors: &[Option<Descriptor>],
) -> Result<(), String> {
    let Some(descriptor) = descriptors.iter().flatten().next() else {
        return Ok(());
    };
    let Some(mut plugin) = entry.create_plugin(Arc::clone(host), &descriptor.id) else {
        return Err(format!(
            "the listed id {:?} did not create a plug-in",
            descriptor.id
        ));
    };
    for attempt in 1..=2 {
        if plugin.activate(48_000.0).is_err() {
            return Err(format!(
                "{:?} declined activation attempt {attempt} at 48 kHz",
                descriptor.id
            ));
        }
        plugin.deactivate();
    }
    Ok(())
}

fn unknown_extension(
    entry: &dyn Entry,
    host: &Arc<dyn Host>,
    descriptors: &[Option<Descriptor>],
) -> Result<(), String> {
    for descriptor in descriptors.iter().flatten() {
        let Some(plugin) = entry.create_plugin(Arc::clone(host), &descriptor.id) else {
            return Err(format!(
                "the listed id {:?} did not create a plug-in",
                descriptor.id
            ));
        };
        if plugin.extension(UNKNOWN_EXTENSION_ID).is_some() {
            return Err(format!(
                "{:?} answered the unknown extension id {UNKNOWN_EXTENSION_ID:?}",
                descriptor.id
            ));
        }
    }
    Ok(())
}
