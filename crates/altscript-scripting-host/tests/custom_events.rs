mod support;

use altscript_scripting_host::{Entity, HostEvent, Locality, ResourceImpl, Value};
use support::{body, string, Fixture, Outcome};

fn foo_event(args: Vec<Value>) -> HostEvent {
    HostEvent::LocalScriptEvent {
        name: "Foo".to_string(),
        args,
    }
}

#[test]
fn test_local_handlers_run_once_in_order() {
    let fixture = Fixture::new();
    fixture.state.define(
        "fanout",
        vec![
            (
                "void Start()",
                body(|inv| {
                    for name in ["One", "Two", "Three"] {
                        inv.native("on", vec![string("Foo"), inv.callback(name)])
                            .unwrap();
                    }
                    Outcome::Finished
                }),
            ),
            (
                "void One(array<any>@ args)",
                body(|inv| {
                    inv.record("One");
                    Outcome::Finished
                }),
            ),
            (
                "void Two(array<any>@ args)",
                body(|inv| {
                    inv.record("Two");
                    Outcome::Returned(false)
                }),
            ),
            (
                "void Three(array<any>@ args)",
                body(|inv| {
                    inv.record("Three");
                    Outcome::Finished
                }),
            ),
        ],
    );
    let mut resource = fixture.start("program fanout");

    assert!(resource.on_event(&foo_event(Vec::new())));
    assert_eq!(fixture.state.trace(), vec!["One", "Two", "Three"]);
}

#[test]
fn test_handlers_receive_event_arguments() {
    let fixture = Fixture::new();
    fixture.state.define(
        "args",
        vec![
            (
                "void Start()",
                body(|inv| {
                    inv.native("on", vec![string("Foo"), inv.callback("OnFoo")])
                        .unwrap();
                    Outcome::Finished
                }),
            ),
            (
                "void OnFoo(array<any>@ args)",
                body(|inv| {
                    let args = inv.array(0).unwrap();
                    inv.record(format!("{:?}", args));
                    Outcome::Finished
                }),
            ),
        ],
    );
    let mut resource = fixture.start("program args");

    resource.on_event(&foo_event(vec![Value::from(7i64), Value::from("seven")]));
    assert_eq!(
        fixture.state.trace(),
        vec![format!("{:?}", vec![Value::Int(7), Value::String("seven".to_string())])]
    );
}

#[test]
fn test_remote_handlers_receive_the_player() {
    let fixture = Fixture::new();
    fixture.state.define(
        "remote",
        vec![
            (
                "void Start()",
                body(|inv| {
                    inv.native("onClient", vec![string("Foo"), inv.callback("OnRemote")])
                        .unwrap();
                    inv.native("on", vec![string("Foo"), inv.callback("OnLocal")])
                        .unwrap();
                    Outcome::Finished
                }),
            ),
            (
                "void OnRemote(IPlayer@ player, array<any>@ args)",
                body(|inv| {
                    let player = inv.entity(0).unwrap();
                    let args = inv.array(1).unwrap();
                    inv.record(format!("remote {} {}", player.id, args.len()));
                    Outcome::Finished
                }),
            ),
            (
                "void OnLocal(array<any>@ args)",
                body(|inv| {
                    inv.record("local");
                    Outcome::Finished
                }),
            ),
        ],
    );
    let mut resource = fixture.start("program remote");

    assert!(resource.on_event(&HostEvent::RemoteScriptEvent {
        name: "Foo".to_string(),
        player: Entity::player(9),
        args: vec![Value::Bool(true), Value::None],
    }));
    assert_eq!(fixture.state.trace(), vec!["remote 9 2"]);
}

#[test]
fn test_unknown_event_name_is_ignored() {
    let fixture = Fixture::new();
    fixture
        .state
        .define("basic", vec![("void Start()", body(|_| Outcome::Finished))]);
    let mut resource = fixture.start("program basic");

    assert!(resource.on_event(&foo_event(vec![Value::Bool(true)])));
    assert!(fixture.state.trace().is_empty());
}

#[test]
fn test_exception_does_not_stop_fan_out() {
    let fixture = Fixture::new();
    fixture.state.define(
        "faulty",
        vec![
            (
                "void Start()",
                body(|inv| {
                    inv.native("on", vec![string("Foo"), inv.callback("Faulty")])
                        .unwrap();
                    inv.native("on", vec![string("Foo"), inv.callback("Healthy")])
                        .unwrap();
                    Outcome::Finished
                }),
            ),
            (
                "void Faulty(array<any>@ args)",
                body(|inv| {
                    inv.record("Faulty");
                    Outcome::Exception("Null pointer access")
                }),
            ),
            (
                "void Healthy(array<any>@ args)",
                body(|inv| {
                    inv.record("Healthy");
                    Outcome::Finished
                }),
            ),
        ],
    );
    let mut resource = fixture.start("program faulty");

    resource.dispatch_custom_event("Foo", Locality::Local, None, &[]);
    assert_eq!(fixture.state.trace(), vec!["Faulty", "Healthy"]);
}
