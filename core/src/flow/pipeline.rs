// cashbak/src/flow/pipeline.rs

//! `Flow<T, E>`: an ordered list of named steps, each with `before`/`on`/`after`
//! handler phases, executed against a shared `FlowContext<T>`.

use crate::error::{FlowError, FlowResult};
use crate::flow::context::FlowContext;
use crate::flow::control::{FlowOutcome, Phase, StepControl};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, instrument, warn, Instrument};

/// A boxed async step handler.
///
/// Handlers must drop any guard taken on the context before awaiting.
pub type StepHandler<T, E> =
  Box<dyn Fn(FlowContext<T>) -> Pin<Box<dyn Future<Output = Result<StepControl, E>> + Send>> + Send + Sync>;

/// Evaluated before a step runs; `true` skips the step.
pub type SkipCondition<T> = Arc<dyn Fn(FlowContext<T>) -> bool + Send + Sync + 'static>;

#[derive(Clone)]
pub struct StepDef<T: Send + Sync + 'static> {
  pub name: String,
  /// Optional steps may have no handlers, and their failures are logged instead of ending the run.
  pub optional: bool,
  pub skip_if: Option<SkipCondition<T>>,
}

impl<T: Send + Sync + 'static> std::fmt::Debug for StepDef<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}

struct PhaseHandlers<T: Send + Sync + 'static, E> {
  before: Vec<StepHandler<T, E>>,
  on: Vec<StepHandler<T, E>>,
  after: Vec<StepHandler<T, E>>,
}

impl<T: Send + Sync + 'static, E> Default for PhaseHandlers<T, E> {
  fn default() -> Self {
    Self {
      before: Vec::new(),
      on: Vec::new(),
      after: Vec::new(),
    }
  }
}

impl<T: Send + Sync + 'static, E> PhaseHandlers<T, E> {
  fn get(&self, phase: Phase) -> &[StepHandler<T, E>] {
    match phase {
      Phase::Before => &self.before,
      Phase::On => &self.on,
      Phase::After => &self.after,
    }
  }

  fn get_mut(&mut self, phase: Phase) -> &mut Vec<StepHandler<T, E>> {
    match phase {
      Phase::Before => &mut self.before,
      Phase::On => &mut self.on,
      Phase::After => &mut self.after,
    }
  }

  fn is_empty(&self) -> bool {
    self.before.is_empty() && self.on.is_empty() && self.after.is_empty()
  }
}

pub struct Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  name: String,
  steps: Vec<StepDef<T>>,
  handlers: HashMap<String, PhaseHandlers<T, E>>,
}

impl<T, E> Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Creates a flow from `(step_name, optional)` pairs, run in the given order.
  pub fn new(name: impl Into<String>, step_defs: &[(&str, bool)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(step_name, optional)| StepDef {
        name: (*step_name).to_string(),
        optional: *optional,
        skip_if: None,
      })
      .collect();

    Self {
      name: name.into(),
      steps,
      handlers: HashMap::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  fn step_mut(&mut self, step_name: &str) -> FlowResult<&mut StepDef<T>> {
    self
      .steps
      .iter_mut()
      .find(|s| s.name == step_name)
      .ok_or_else(|| FlowError::StepNotFound {
        step_name: step_name.to_string(),
      })
  }

  pub fn set_skip_condition(
    &mut self,
    step_name: &str,
    condition: impl Fn(FlowContext<T>) -> bool + Send + Sync + 'static,
  ) -> FlowResult<&mut Self> {
    self.step_mut(step_name)?.skip_if = Some(Arc::new(condition));
    Ok(self)
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) -> FlowResult<&mut Self> {
    self.step_mut(step_name)?.optional = optional;
    Ok(self)
  }

  fn register<F, Fut, UserErr>(&mut self, phase: Phase, step_name: &str, handler_fn: F) -> FlowResult<&mut Self>
  where
    F: Fn(FlowContext<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<E> + Send + 'static,
  {
    self.step_mut(step_name)?;
    let handler: StepHandler<T, E> = Box::new(move |ctx| {
      let user_fut = handler_fn(ctx);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    self
      .handlers
      .entry(step_name.to_string())
      .or_default()
      .get_mut(phase)
      .push(handler);
    debug!(flow = %self.name, %step_name, phase = phase.as_str(), "Handler registered.");
    Ok(self)
  }

  pub fn before<F, Fut, UserErr>(&mut self, step_name: &str, handler_fn: F) -> FlowResult<&mut Self>
  where
    F: Fn(FlowContext<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<E> + Send + 'static,
  {
    self.register(Phase::Before, step_name, handler_fn)
  }

  pub fn on<F, Fut, UserErr>(&mut self, step_name: &str, handler_fn: F) -> FlowResult<&mut Self>
  where
    F: Fn(FlowContext<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<E> + Send + 'static,
  {
    self.register(Phase::On, step_name, handler_fn)
  }

  pub fn after<F, Fut, UserErr>(&mut self, step_name: &str, handler_fn: F) -> FlowResult<&mut Self>
  where
    F: Fn(FlowContext<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<E> + Send + 'static,
  {
    self.register(Phase::After, step_name, handler_fn)
  }

  /// Runs every step in order against `ctx`.
  ///
  /// A required step with no handlers fails with `FlowError::HandlerMissing`.
  /// A failing optional step is logged and the run moves on to the next step.
  #[instrument(
    name = "Flow::run",
    skip_all,
    fields(flow = %self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx: FlowContext<T>) -> Result<FlowOutcome, E> {
    debug!("Flow execution starting.");

    for (step_index, step) in self.steps.iter().enumerate() {
      let span = info_span!(
        "flow_step",
        step_name = %step.name,
        step_index,
        optional = step.optional
      );
      match self.run_step(step, ctx.clone()).instrument(span).await {
        Ok(StepControl::Continue) => {}
        Ok(StepControl::Stop) => {
          info!(step_name = %step.name, "Flow stopped by a handler.");
          return Ok(FlowOutcome::Stopped);
        }
        Err(e) if step.optional => {
          warn!(step_name = %step.name, error = %e, "Optional step failed; continuing.");
        }
        Err(e) => return Err(e),
      }
    }

    debug!("Flow execution completed.");
    Ok(FlowOutcome::Completed)
  }

  async fn run_step(&self, step: &StepDef<T>, ctx: FlowContext<T>) -> Result<StepControl, E> {
    if let Some(skip) = &step.skip_if {
      if skip(ctx.clone()) {
        info!("Step skipped due to skip condition.");
        return Ok(StepControl::Continue);
      }
    }

    let Some(handlers) = self.handlers.get(&step.name).filter(|h| !h.is_empty()) else {
      if step.optional {
        debug!("Optional step has no handlers, skipping.");
        return Ok(StepControl::Continue);
      }
      error!("Required step has no handlers.");
      return Err(E::from(FlowError::HandlerMissing {
        step_name: step.name.clone(),
      }));
    };

    for phase in Phase::ALL {
      for (handler_index, handler_fn) in handlers.get(phase).iter().enumerate() {
        match handler_fn(ctx.clone()).await {
          Ok(StepControl::Continue) => {}
          Ok(StepControl::Stop) => {
            debug!(phase = phase.as_str(), handler_index, "Handler requested stop.");
            return Ok(StepControl::Stop);
          }
          Err(e) => {
            error!(phase = phase.as_str(), handler_index, error = %e, "Handler failed.");
            return Err(e);
          }
        }
      }
    }
    Ok(StepControl::Continue)
  }
}
