//! Exposure and dispatch contract across the composed agent surface.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use func_common::{Call, CallArgs, FailureKind, OperationFailure};
use func_minion::application::AgentSurface;
use func_minion::application::exposure::{CapabilityModule, ExposureTable, Module};
use func_minion::application::modules::{CommandModule, RebootModule, ServiceModule};
use func_minion::domain::ExposureError;
use serde_json::Value;

use crate::mocks::{GatedRunner, PanickingRunner, RecordingRunner, StaticProbe};

struct Harness {
    command: Arc<RecordingRunner>,
    service: Arc<RecordingRunner>,
    reboot: Arc<RecordingRunner>,
    agent: AgentSurface,
}

fn harness() -> Harness {
    let command = RecordingRunner::exiting(0);
    let service = RecordingRunner::exiting(0);
    let reboot = RecordingRunner::exiting(0);
    let agent = AgentSurface::compose([
        Module::new(CommandModule::new(command.clone(), "which"))
            .unwrap()
            .register_rpc(),
        Module::new(ServiceModule::new(
            service.clone(),
            StaticProbe::with(&["httpd"]),
            "service",
        ))
        .unwrap()
        .register_rpc(),
        Module::new(RebootModule::new(reboot.clone(), "shutdown"))
            .unwrap()
            .register_rpc(),
    ])
    .unwrap();
    Harness {
        command,
        service,
        reboot,
        agent,
    }
}

#[test]
fn register_rpc_twice_exposes_identical_names() {
    let command = Module::new(CommandModule::new(RecordingRunner::exiting(0), "which")).unwrap();
    let service = Module::new(ServiceModule::new(
        RecordingRunner::exiting(0),
        StaticProbe::none(),
        "service",
    ))
    .unwrap();
    let reboot = Module::new(RebootModule::new(RecordingRunner::exiting(0), "shutdown")).unwrap();

    assert_eq!(
        command.register_rpc().operations(),
        command.register_rpc().operations()
    );
    assert_eq!(
        service.register_rpc().operations(),
        service.register_rpc().operations()
    );
    assert_eq!(
        reboot.register_rpc().operations(),
        reboot.register_rpc().operations()
    );
}

#[tokio::test]
async fn undeclared_names_never_invoke_a_handler() {
    let h = harness();
    let undeclared = [
        "register_rpc",
        "methods",
        "__init__",
        "_Service__command",
        "control",
        "rpc_run",
        "start",
        "stop",
        "Run",
        "service_stop ",
        "command.run",
        "",
    ];

    for name in undeclared {
        let err = h
            .agent
            .dispatch(Call::new(name, CallArgs::positional(["httpd"])))
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::UnknownOperation, "{name:?}");
    }

    assert!(!h.command.was_called());
    assert!(!h.service.was_called());
    assert!(!h.reboot.was_called());
}

#[tokio::test]
async fn dispatch_reaches_each_module() {
    let h = harness();

    let ran = h
        .agent
        .dispatch(Call::new("run", CallArgs::positional(["uptime"])))
        .await
        .unwrap();
    assert_eq!(ran["exit_code"], 0);

    let status = h
        .agent
        .dispatch(Call::new("service_status", CallArgs::positional(["httpd"])))
        .await
        .unwrap();
    assert_eq!(status, Value::from(0));

    h.agent
        .dispatch(Call::new("reboot", CallArgs::none()))
        .await
        .unwrap();

    assert_eq!(h.command.calls().len(), 1);
    assert_eq!(h.service.calls().len(), 1);
    assert_eq!(h.reboot.calls().len(), 1);
}

#[test]
fn composing_two_modules_with_the_same_name_fails() {
    let first = Module::new(CommandModule::new(RecordingRunner::exiting(0), "which")).unwrap();
    let second = Module::new(CommandModule::new(RecordingRunner::exiting(0), "which")).unwrap();

    let err = AgentSurface::compose([first.register_rpc(), second.register_rpc()]).unwrap_err();

    assert_eq!(
        err,
        ExposureError::Collision {
            operation: "exists",
            first: "command",
            second: "command",
        }
    );
}

struct Impostor;

impl CapabilityModule for Impostor {
    const NAME: &'static str = "impostor";

    fn declare(table: &mut ExposureTable<Self>) {
        table.expose("reboot", |_m, _a| async {
            Ok::<&str, OperationFailure>("not a reboot")
        });
    }
}

#[test]
fn collision_is_detected_at_composition_not_per_call() {
    let reboot = Module::new(RebootModule::new(RecordingRunner::exiting(0), "shutdown")).unwrap();
    let impostor = Module::new(Impostor).unwrap();

    let err = AgentSurface::compose([reboot.register_rpc(), impostor.register_rpc()]).unwrap_err();

    assert_eq!(
        err,
        ExposureError::Collision {
            operation: "reboot",
            first: "reboot",
            second: "impostor",
        }
    );
    assert!(err.to_string().contains("'reboot' and 'impostor'"));
}

#[tokio::test]
async fn panicking_capability_becomes_invocation_error_and_agent_survives() {
    let agent = AgentSurface::compose([
        Module::new(CommandModule::new(PanickingRunner, "which"))
            .unwrap()
            .register_rpc(),
        Module::new(RebootModule::new(RecordingRunner::exiting(0), "shutdown"))
            .unwrap()
            .register_rpc(),
    ])
    .unwrap();

    let err = agent
        .dispatch(Call::new("run", CallArgs::positional(["ls"])))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvocationError);
    assert!(err.message.contains("runner exploded"), "{}", err.message);

    let after = agent
        .dispatch(Call::new("reboot", CallArgs::none()))
        .await
        .unwrap();
    assert_eq!(after, Value::from(0));
}

#[tokio::test]
async fn slow_call_does_not_stall_unrelated_calls() {
    let runner = Arc::new(GatedRunner::default());
    let agent = AgentSurface::compose([Module::new(CommandModule::new(runner.clone(), "which"))
        .unwrap()
        .register_rpc()])
    .unwrap();

    let slow = tokio::spawn({
        let agent = agent.clone();
        async move {
            agent
                .dispatch(Call::new("run", CallArgs::positional(["block"])))
                .await
        }
    });

    let quick = tokio::time::timeout(
        Duration::from_secs(5),
        agent.dispatch(Call::new("run", CallArgs::positional(["uptime"]))),
    )
    .await
    .expect("quick call must not wait behind the blocked one")
    .unwrap();
    assert_eq!(quick["exit_code"], 0);
    assert!(!slow.is_finished());

    runner.release();
    let slow = slow.await.unwrap().unwrap();
    assert_eq!(slow["exit_code"], 0);
}
