//! End-to-end behavior of callback chains on a small document model.
//!
//! Covers:
//!
//! 1. **Order**: befores as declared, arounds nested, afters reversed
//! 2. **Guards**: failing guards skip a callback without halting
//! 3. **Halting**: a terminator stops before/around/core, afters still run
//! 4. **Inheritance**: subtypes copy on write, ancestors never change
//! 5. **Passthrough**: the core action's value comes back out of the run

use hookchain::prelude::*;
use hookchain_core::test_utils::RecordingTarget;
use serde_json::json;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Document: a target with real state
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct Document {
    kind: &'static str,
    title: String,
    published: bool,
    events: Vec<String>,
}

impl Document {
    fn new(kind: &'static str, title: &str) -> Self {
        Self {
            kind,
            title: title.to_owned(),
            published: false,
            events: Vec::new(),
        }
    }
}

impl Target for Document {
    fn type_name(&self) -> &str {
        self.kind
    }

    fn call(&mut self, method: &str, _args: &[Value]) -> Result<Value, CallbackError> {
        match method {
            "has_title" => Ok(json!(!self.title.is_empty())),
            "strip_title" => {
                self.title = self.title.trim().to_owned();
                self.events.push("strip_title".into());
                Ok(Value::Null)
            }
            "check_title" => {
                self.events.push("check_title".into());
                Ok(json!(!self.title.is_empty()))
            }
            "index" | "notify" => {
                self.events.push(method.to_owned());
                Ok(Value::Null)
            }
            other => Err(CallbackError::NoMethod(other.to_owned())),
        }
    }

    fn call_around(
        &mut self,
        method: &str,
        _args: &[Value],
        next: Next<'_, Self>,
    ) -> Result<Value, CallbackError> {
        match method {
            "transaction" => {
                self.events.push("begin".into());
                let value = next.run(self)?;
                self.events.push("commit".into());
                Ok(value)
            }
            other => Err(CallbackError::NoMethod(other.to_owned())),
        }
    }

    fn halted_callback_hook(&mut self, identity: &Identity) {
        self.events.push(format!("halted by {identity}"));
    }
}

const DOCUMENT_METHODS: [&str; 6] = [
    "has_title",
    "strip_title",
    "check_title",
    "index",
    "notify",
    "transaction",
];

fn documents() -> Registry<Document> {
    let registry = Registry::new();
    registry
        .define_type(TypeDef::new("Document").methods(DOCUMENT_METHODS))
        .unwrap();
    registry
        .define_type(TypeDef::new("Memo").parent("Document"))
        .unwrap();
    registry
        .define_callbacks(
            "Document",
            "save",
            ChainConfig::new().terminator(Terminator::on_value(json!(false))),
        )
        .unwrap();

    let add = |kind, name: &str| {
        let hooks = [Hook::method(name)];
        registry
            .set_callback("Document", "save", kind, hooks, SetOptions::new())
            .unwrap();
    };
    add(Kind::Before, "strip_title");
    add(Kind::Before, "check_title");
    add(Kind::Around, "transaction");
    add(Kind::After, "index");
    add(Kind::After, "notify");
    registry
}

fn save(registry: &Registry<Document>, doc: &mut Document) -> Outcome {
    registry
        .run_callbacks("save", doc, &[], |doc: &mut Document| {
            doc.published = true;
            doc.events.push("write".into());
            Ok(json!({ "title": doc.title }))
        })
        .unwrap()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Documents
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn save_runs_every_phase_and_returns_core_value() {
    let registry = documents();
    let mut doc = Document::new("Document", "  Hello  ");
    let outcome = save(&registry, &mut doc);

    assert_eq!(outcome, Outcome::Completed(json!({ "title": "Hello" })));
    assert!(doc.published);
    assert_eq!(
        doc.events.join(" "),
        "strip_title check_title begin write commit notify index"
    );
}

#[test]
fn failed_validation_halts_but_after_callbacks_run() {
    let registry = documents();
    let mut doc = Document::new("Document", "   ");
    let outcome = save(&registry, &mut doc);

    assert_eq!(outcome.halted_by(), Some(&Identity::from("check_title")));
    assert!(!doc.published);
    assert_eq!(
        doc.events.join(", "),
        "strip_title, check_title, halted by :check_title, notify, index"
    );
}

#[test]
fn subtype_can_drop_validation_without_touching_parent() {
    let registry = documents();
    registry
        .skip_callback(
            "Memo",
            "save",
            Kind::Before,
            "check_title",
            SkipOptions::new().unless(Predicate::method("has_title")),
        )
        .unwrap();

    let mut memo = Document::new("Memo", "");
    assert!(!save(&registry, &mut memo).is_halted());
    assert!(memo.published);

    let mut doc = Document::new("Document", "");
    assert!(save(&registry, &mut doc).is_halted());
}

#[test]
fn closure_guard_reads_target_state() {
    let registry = documents();
    registry
        .set_callback(
            "Memo",
            "save",
            Kind::Before,
            [Hook::closure(|doc: &mut Document, _: &[Value]| {
                doc.events.push("shout".into());
                doc.title = doc.title.to_uppercase();
                Ok(Value::Null)
            })],
            SetOptions::new().only_if(Predicate::when(|doc: &Document| doc.title.ends_with('!'))),
        )
        .unwrap();

    let mut quiet = Document::new("Memo", "hi");
    save(&registry, &mut quiet);
    assert_eq!(quiet.title, "hi");

    let mut loud = Document::new("Memo", "hi!");
    save(&registry, &mut loud);
    assert_eq!(loud.title, "HI!");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chain properties on a recording target
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn recording(names: &[&str]) -> Registry<RecordingTarget> {
    let registry = Registry::new();
    registry
        .define_type(TypeDef::new("Rec").methods(names.iter().copied()))
        .unwrap();
    registry
        .define_callbacks(
            "Rec",
            "run",
            ChainConfig::new().terminator(Terminator::parse("result == \"HALT\"").unwrap()),
        )
        .unwrap();
    registry
}

fn rec(names: &[&str]) -> RecordingTarget {
    names.iter().fold(RecordingTarget::new("Rec"), |t, name| {
        t.with_method(*name, Value::Null).with_around(*name)
    })
}

fn core(t: &mut RecordingTarget) -> Result<Value, CallbackError> {
    t.record("R");
    Ok(json!("result"))
}

fn add(registry: &Registry<RecordingTarget>, kind: Kind, name: &str) {
    let hooks = [Hook::method(name)];
    registry
        .set_callback("Rec", "run", kind, hooks, SetOptions::new())
        .unwrap();
}

#[test]
fn arounds_nest_first_declared_outermost() {
    let registry = recording(&["A", "B", "C"]);
    registry
        .set_callback(
            "Rec",
            "run",
            Kind::Around,
            ["A", "B", "C"].map(Hook::method),
            SetOptions::new(),
        )
        .unwrap();

    let mut t = rec(&["A", "B", "C"]);
    registry.run_callbacks("run", &mut t, &[], core).unwrap();
    assert_eq!(
        t.log().join(" "),
        "A:pre B:pre C:pre R C:post B:post A:post"
    );
}

#[test]
fn halting_example() {
    let names = ["first", "second", "third"];
    let registry = recording(&names);
    for kind in [Kind::Before, Kind::After] {
        let hooks = names.map(Hook::method);
        registry
            .set_callback("Rec", "run", kind, hooks, SetOptions::new())
            .unwrap();
    }

    let mut t = rec(&names).with_method("second", json!("HALT"));
    let outcome = registry.run_callbacks("run", &mut t, &[], core).unwrap();
    assert!(outcome.is_halted());
    assert_eq!(t.log(), ["first", "second", "third", "second", "first"]);
}

#[test]
fn false_guard_filters_one_callback() {
    let registry = recording(&["X", "Y"]);
    registry
        .set_callback(
            "Rec",
            "run",
            Kind::Before,
            [Hook::method("X")],
            SetOptions::new().only_if(Predicate::when(|_: &RecordingTarget| false)),
        )
        .unwrap();
    add(&registry, Kind::Before, "Y");

    let mut t = rec(&["X", "Y"]);
    registry.run_callbacks("run", &mut t, &[], core).unwrap();
    assert_eq!(t.log(), ["Y", "R"]);
}

#[test]
fn same_hook_twice_runs_twice() {
    let registry = recording(&["X"]);
    for _ in 0..2 {
        add(&registry, Kind::Before, "X");
    }
    let mut t = rec(&["X"]);
    registry.run_callbacks("run", &mut t, &[], core).unwrap();
    assert_eq!(t.log(), ["X", "X", "R"]);
}

#[test]
fn around_that_skips_the_core_completes_with_null() {
    let registry = recording(&["A"]);
    registry
        .set_callback(
            "Rec",
            "run",
            Kind::Around,
            [Hook::around(|t: &mut RecordingTarget, _: &[Value], _next| {
                t.record("cached");
                Ok(json!("from cache"))
            })],
            SetOptions::new(),
        )
        .unwrap();
    add(&registry, Kind::After, "A");

    let mut t = rec(&["A"]);
    let outcome = registry.run_callbacks("run", &mut t, &[], core).unwrap();
    assert_eq!(outcome.into_value(), Some(Value::Null));
    assert_eq!(t.log(), ["cached", "A"]);
}

#[test]
fn around_values_never_replace_the_core_value() {
    let registry = recording(&["A"]);
    registry
        .set_callback(
            "Rec",
            "run",
            Kind::Around,
            [Hook::around(|t: &mut RecordingTarget, _: &[Value], next| {
                next.run(t)?;
                Ok(json!("from around"))
            })],
            SetOptions::new(),
        )
        .unwrap();
    add(&registry, Kind::Around, "A");

    let mut t = rec(&["A"]);
    let outcome = registry.run_callbacks("run", &mut t, &[], core).unwrap();
    assert_eq!(outcome, Outcome::Completed(json!("result")));
    assert_eq!(t.log(), ["A:pre", "R", "A:post"]);
}

#[test]
fn registration_errors_fail_fast() {
    let registry = recording(&["X"]);
    let set = |owner: &str, method: &str| {
        let hooks = [Hook::method(method)];
        registry.set_callback(owner, "run", Kind::Before, hooks, SetOptions::new())
    };
    assert!(matches!(
        set("Rec", "Y"),
        Err(RegistrationError::MissingMethod { .. })
    ));
    assert!(matches!(
        set("Nope", "X"),
        Err(RegistrationError::UnknownType(name)) if name == "Nope"
    ));
    assert!(matches!(
        Terminator::parse("result >= 3"),
        Err(RegistrationError::MalformedTerminator(_))
    ));
}
