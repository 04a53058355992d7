// tests/flow_tests.rs
mod common;

use anyhow::anyhow;
use cashbak::{Flow, FlowContext, FlowError, FlowOutcome, StepControl};
use common::*;
use serial_test::serial;

#[derive(Debug, Default, Clone)]
struct Trace {
  visited: Vec<String>,
  stop_at: Option<&'static str>,
}

#[derive(Debug, thiserror::Error)]
enum TestError {
  #[error("flow: {0}")]
  Flow(#[from] FlowError),
  #[error("handler failed: {0}")]
  Handler(String),
}

type TestFlow = Flow<Trace, TestError>;

fn record(flow: &mut TestFlow, step: &'static str) {
  flow
    .on(step, move |ctx: FlowContext<Trace>| async move {
      let mut guard = ctx.write();
      guard.visited.push(step.to_string());
      if guard.stop_at == Some(step) {
        return Ok::<_, TestError>(StepControl::Stop);
      }
      Ok(StepControl::Continue)
    })
    .expect("step exists");
}

fn visited(ctx: &FlowContext<Trace>) -> Vec<String> {
  ctx.read().visited.clone()
}

#[tokio::test]
#[serial]
async fn test_steps_and_phases_run_in_order() {
  setup_tracing();
  let mut flow = TestFlow::new("ordering", &[("a", false), ("b", false)]);
  record(&mut flow, "a");
  record(&mut flow, "b");
  flow
    .before("b", |ctx: FlowContext<Trace>| async move {
      ctx.write().visited.push("before b".into());
      Ok::<_, TestError>(StepControl::Continue)
    })
    .unwrap()
    .after("b", |ctx: FlowContext<Trace>| async move {
      ctx.write().visited.push("after b".into());
      Ok::<_, TestError>(StepControl::Continue)
    })
    .unwrap();

  let ctx = FlowContext::new(Trace::default());
  assert_eq!(flow.run(ctx.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(visited(&ctx), vec!["a", "before b", "b", "after b"]);
  assert_eq!(flow.step_names(), vec!["a", "b"]);
}

#[tokio::test]
#[serial]
async fn test_stop_halts_remaining_steps() {
  setup_tracing();
  let mut flow = TestFlow::new("stopping", &[("a", false), ("b", false), ("c", false)]);
  for step in ["a", "b", "c"] {
    record(&mut flow, step);
  }

  let ctx = FlowContext::new(Trace {
    stop_at: Some("b"),
    ..Default::default()
  });
  assert_eq!(flow.run(ctx.clone()).await.unwrap(), FlowOutcome::Stopped);
  assert_eq!(visited(&ctx), vec!["a", "b"]);
}

#[tokio::test]
#[serial]
async fn test_required_step_without_handler_fails() {
  setup_tracing();
  let mut flow = TestFlow::new("missing", &[("a", false), ("b", false)]);
  record(&mut flow, "a");

  let ctx = FlowContext::new(Trace::default());
  let err = flow.run(ctx.clone()).await.unwrap_err();
  assert!(matches!(err, TestError::Flow(FlowError::HandlerMissing { ref step_name }) if step_name == "b"));
  assert_eq!(visited(&ctx), vec!["a"]);
}

#[tokio::test]
#[serial]
async fn test_registering_on_unknown_step_fails() {
  let mut flow = TestFlow::new("unknown", &[("a", false)]);
  let result = flow.on("nope", |_ctx: FlowContext<Trace>| async move {
    Ok::<_, TestError>(StepControl::Continue)
  });
  assert!(matches!(result, Err(FlowError::StepNotFound { .. })));
  assert!(flow.set_skip_condition("nope", |_| true).is_err());
}

#[tokio::test]
#[serial]
async fn test_required_failure_aborts_but_optional_failure_continues() {
  setup_tracing();
  let mut flow = TestFlow::new("failures", &[("a", false), ("flaky", true), ("c", false)]);
  record(&mut flow, "a");
  record(&mut flow, "c");
  flow
    .on("flaky", |_ctx: FlowContext<Trace>| async move {
      Err::<StepControl, _>(TestError::Handler("mailer down".into()))
    })
    .unwrap();

  let ctx = FlowContext::new(Trace::default());
  assert_eq!(flow.run(ctx.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(visited(&ctx), vec!["a", "c"]);

  flow.set_optional("flaky", false).unwrap();
  let ctx = FlowContext::new(Trace::default());
  let err = flow.run(ctx.clone()).await.unwrap_err();
  assert!(matches!(err, TestError::Handler(ref msg) if msg == "mailer down"));
  assert_eq!(visited(&ctx), vec!["a"]);
}

#[tokio::test]
#[serial]
async fn test_skip_condition_bypasses_step() {
  setup_tracing();
  let mut flow = TestFlow::new("skipping", &[("a", false), ("b", false), ("c", false)]);
  for step in ["a", "b", "c"] {
    record(&mut flow, step);
  }
  flow
    .set_skip_condition("b", |ctx: FlowContext<Trace>| ctx.read().visited.contains(&"a".to_string()))
    .unwrap();

  let ctx = FlowContext::new(Trace::default());
  assert_eq!(flow.run(ctx.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(visited(&ctx), vec!["a", "c"]);
}

#[tokio::test]
#[serial]
async fn test_anyhow_errors_convert_through_flow_error() {
  setup_tracing();
  let mut flow = TestFlow::new("anyhow", &[("a", false)]);
  flow
    .on("a", |_ctx: FlowContext<Trace>| async move {
      Err::<StepControl, FlowError>(anyhow!("backend exploded").into())
    })
    .unwrap();

  let err = flow.run(FlowContext::new(Trace::default())).await.unwrap_err();
  assert!(matches!(err, TestError::Flow(FlowError::HandlerError { .. })));
  assert!(err.to_string().contains("backend exploded"));
}

#[test]
fn test_context_unwraps_when_last_handle() {
  let ctx = FlowContext::new(Trace::default());
  let other = ctx.clone();
  let ctx = ctx.try_unwrap().unwrap_err();
  drop(other);
  let trace = ctx.try_unwrap().expect("sole owner");
  assert!(trace.visited.is_empty());
  assert_eq!(*FlowContext::new(vec![1, 2]).map_read(|v| &v[1]), 2);
}
