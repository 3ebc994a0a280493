use chameleon_core::{
    ComponentBehavior, ComponentContext, ComponentInit, ImplementationCatalog, InvokeError, Loader,
    LoaderError, RuntimeConfig, StandardExtension,
};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

fn write_component(root: &Path, folder: &str, descriptor: Value) {
    let dir = root.join(folder);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("component.json"),
        serde_json::to_string_pretty(&descriptor).unwrap(),
    )
    .unwrap();
}

type Journal = Arc<Mutex<Vec<String>>>;

struct Recorder {
    identifier: String,
    journal: Journal,
}

impl ComponentBehavior for Recorder {
    fn invoke(&self, context: &ComponentContext<'_>) -> Result<(), InvokeError> {
        assert_eq!(context.component().identifier(), self.identifier);
        self.journal.lock().unwrap().push(self.identifier.clone());
        Ok(())
    }
}

struct Failing;

impl ComponentBehavior for Failing {
    fn invoke(&self, _context: &ComponentContext<'_>) -> Result<(), InvokeError> {
        Err(InvokeError::new("refused to start"))
    }
}

struct Greeter {
    greeting: String,
}

impl Greeter {
    fn greet(&self, name: &str) -> String {
        format!("{}, {name}", self.greeting)
    }
}

impl ComponentBehavior for Greeter {}

struct Caller {
    journal: Journal,
}

impl ComponentBehavior for Caller {
    fn invoke(&self, context: &ComponentContext<'_>) -> Result<(), InvokeError> {
        let greeter = context
            .get_component("greeter")
            .map_err(|err| InvokeError::new(err.to_string()))?;
        let greeter = greeter
            .behavior::<Greeter>()
            .ok_or_else(|| InvokeError::new("greeter has an unexpected implementation"))?;
        let menu: Vec<&str> = context
            .extensions("urn:menu")
            .iter()
            .filter_map(|e| e.payload::<StandardExtension>())
            .map(StandardExtension::value)
            .collect();
        let suffix = context.property("suffix").unwrap_or_default();

        self.journal
            .lock()
            .unwrap()
            .push(format!("{} {}{suffix}", greeter.greet("caller"), menu.join("+")));
        Ok(())
    }
}

fn catalog(journal: &Journal) -> ImplementationCatalog {
    let mut catalog = ImplementationCatalog::new();
    let recorder_journal = journal.clone();
    catalog
        .register_component("recorder", move |init: &ComponentInit<'_>| Recorder {
            identifier: init.identifier.to_string(),
            journal: recorder_journal.clone(),
        })
        .unwrap();
    catalog
        .register_component("failing", |_: &ComponentInit<'_>| Failing)
        .unwrap();
    catalog
        .register_component("greeter", |init: &ComponentInit<'_>| Greeter {
            greeting: init.config.property("greeting").unwrap_or("hello").to_string(),
        })
        .unwrap();
    let caller_journal = journal.clone();
    catalog
        .register_component("caller", move |_: &ComponentInit<'_>| Caller {
            journal: caller_journal.clone(),
        })
        .unwrap();
    catalog
}

#[test]
fn invoke_all_runs_hooks_in_load_order() {
    let root = tempfile::tempdir().unwrap();
    write_component(
        root.path(),
        "a",
        json!({ "identifier": "a", "version": "1", "implementation": "recorder", "requires": ["c"] }),
    );
    write_component(
        root.path(),
        "b",
        json!({ "identifier": "b", "version": "1", "implementation": "recorder" }),
    );
    write_component(
        root.path(),
        "c",
        json!({ "identifier": "c", "version": "1", "implementation": "recorder" }),
    );

    let journal = Journal::default();
    let registry = Loader::new()
        .with_catalog(catalog(&journal))
        .resolve_all(root.path())
        .unwrap();
    registry.invoke_all().unwrap();

    assert_eq!(*journal.lock().unwrap(), vec!["c", "a", "b"]);
}

#[test]
fn first_failing_hook_stops_activation() {
    let root = tempfile::tempdir().unwrap();
    write_component(
        root.path(),
        "a",
        json!({ "identifier": "a", "version": "1", "implementation": "recorder" }),
    );
    write_component(
        root.path(),
        "b",
        json!({ "identifier": "b", "version": "1", "implementation": "failing" }),
    );
    write_component(
        root.path(),
        "c",
        json!({ "identifier": "c", "version": "1", "implementation": "recorder" }),
    );

    let journal = Journal::default();
    let registry = Loader::new()
        .with_catalog(catalog(&journal))
        .resolve_all(root.path())
        .unwrap();

    let err = registry.invoke_all().unwrap_err();
    assert!(matches!(err, LoaderError::Invocation { ref component, .. } if component == "b"));
    assert!(err.to_string().contains("refused to start"));
    assert_eq!(*journal.lock().unwrap(), vec!["a"]);
}

#[test]
fn invoke_single_component() {
    let root = tempfile::tempdir().unwrap();
    write_component(
        root.path(),
        "a",
        json!({ "identifier": "a", "version": "1", "implementation": "recorder" }),
    );
    write_component(
        root.path(),
        "b",
        json!({ "identifier": "b", "version": "1", "implementation": "failing" }),
    );

    let journal = Journal::default();
    let registry = Loader::new()
        .with_catalog(catalog(&journal))
        .resolve_all(root.path())
        .unwrap();

    registry.invoke("a").unwrap();
    registry.invoke("absent").unwrap();
    assert!(registry.invoke("b").is_err());
    assert_eq!(*journal.lock().unwrap(), vec!["a"]);
}

#[test]
fn hooks_reach_other_components_through_context() {
    let root = tempfile::tempdir().unwrap();
    write_component(
        root.path(),
        "a_greeter",
        json!({
            "identifier": "greeter",
            "version": "1",
            "implementation": "greeter",
            "extensionPoints": [{ "namespace": "urn:menu" }],
            "extensions": [{ "namespace": "urn:menu", "value": "home" }]
        }),
    );
    write_component(
        root.path(),
        "b_caller",
        json!({
            "identifier": "caller",
            "version": "1",
            "implementation": "caller",
            "requires": ["greeter"],
            "extensions": [{ "namespace": "urn:menu", "value": "about" }]
        }),
    );

    let journal = Journal::default();
    let config = RuntimeConfig::default()
        .with_property("greeting", "hi")
        .with_property("suffix", "!");
    let registry = Loader::new()
        .with_catalog(catalog(&journal))
        .with_config(config)
        .resolve_all(root.path())
        .unwrap();
    registry.invoke_all().unwrap();

    assert_eq!(*journal.lock().unwrap(), vec!["hi, caller home+about!"]);
}

#[test]
fn unknown_implementation_rejects_component() {
    let root = tempfile::tempdir().unwrap();
    write_component(
        root.path(),
        "a",
        json!({ "identifier": "a", "version": "1", "implementation": "missing" }),
    );

    let registry = Loader::new().resolve_all(root.path()).unwrap();
    assert_eq!(
        registry.failures(),
        &[LoaderError::UnknownImplementation {
            component: "a".to_string(),
            implementation: "missing".to_string(),
        }]
    );
}

#[test]
fn frozen_registry_serves_concurrent_readers() {
    let root = tempfile::tempdir().unwrap();
    write_component(
        root.path(),
        "a",
        json!({
            "identifier": "a",
            "version": "1",
            "extensionPoints": [{ "namespace": "ns" }],
            "extensions": [{ "namespace": "ns", "value": "shared" }]
        }),
    );

    let registry = Loader::new().resolve_all(root.path()).unwrap();
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    assert_eq!(registry.get_component("a").unwrap().identifier(), "a");
                    let value = registry.query("ns")[0]
                        .payload::<StandardExtension>()
                        .unwrap()
                        .value()
                        .to_string();
                    assert_eq!(value, "shared");
                }
            })
        })
        .collect();

    for reader in readers {
        reader.join().unwrap();
    }
}
