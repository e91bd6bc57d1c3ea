//! Two-phase interceptor chain around a handler

use std::panic::{self, AssertUnwindSafe};

use super::handler::Handler;
use super::interceptor::{Interceptor, Middleware, Outcome};
use super::RequestContext;
use crate::error::Failure;

/// Lifecycle of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    Running,
    /// Stopped early by the abort signal; still a successful response
    Aborted,
    Completed,
    Failed,
}

/// Interceptor frames wrapped around a terminal handler
///
/// The first middleware in the list is the outermost one. Running the
/// pipeline calls every `enter()` in order until one aborts or fails, calls
/// the handler only if all of them passed, then calls `exit()` in reverse
/// order for every frame whose `enter()` succeeded.
///
/// # Example
///
/// ```rust
/// use quill_core::app::App;
/// use quill_core::http::{HttpResponse, RawRequest, HttpRequest};
/// use quill_core::pipeline::{Handler, Pipeline, PipelineState, RequestContext};
///
/// let app = App::new();
/// let mut request = HttpRequest::new(RawRequest::new("GET", "/"), Default::default());
/// let mut response = HttpResponse::new();
/// let mut cx = RequestContext::new(&app, &mut request, &mut response);
///
/// let mut pipeline = Pipeline::new(Vec::new(), Handler::new(|_| Ok("hi")));
/// assert_eq!(pipeline.run(&mut cx).unwrap(), PipelineState::Completed);
/// ```
pub struct Pipeline {
    middleware: Vec<Middleware>,
    handler: Handler,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(middleware: Vec<Middleware>, handler: Handler) -> Self {
        Self { middleware, handler, state: PipelineState::Pending }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run the chain once
    ///
    /// Returns the terminal state on success. A failure from any link is
    /// returned after all pending `exit()` hooks ran; when several links fail
    /// the first failure wins. Panics are caught and reported as internal
    /// failures.
    pub fn run(&mut self, cx: &mut RequestContext<'_>) -> Result<PipelineState, Failure> {
        self.state = PipelineState::Running;

        let mut entered = 0;
        let mut aborted = false;
        let mut failure: Option<Failure> = None;

        // A factory that panics leaves no frame entered and skips the handler
        let mut frames: Vec<(&'static str, Box<dyn Interceptor>)> = Vec::with_capacity(self.middleware.len());
        for factory in &self.middleware {
            match guard(|| Ok(factory.create(cx.app, cx.request, cx.response))) {
                Ok(frame) => frames.push((factory.name(), frame)),
                Err(err) => {
                    log::debug!("{} could not build its frame for {}", factory.name(), cx.request.path());
                    failure = Some(err);
                    break;
                }
            }
        }

        if failure.is_none() {
            for (name, frame) in frames.iter_mut() {
                match guard(|| frame.enter(cx)) {
                    Ok(()) => entered += 1,
                    Err(Failure::Abort(_)) => {
                        log::debug!("{} aborted the chain for {}", name, cx.request.path());
                        aborted = true;
                        break;
                    }
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                }
            }
        }

        if !aborted && failure.is_none() {
            match guard(|| self.handler.call(cx)) {
                Ok(body) => {
                    if !body.is_empty() || cx.response.body().is_empty() {
                        cx.response.set_body(body);
                    }
                }
                Err(Failure::Abort(_)) => aborted = true,
                Err(err) => failure = Some(err),
            }
        }

        let outcome = match (&failure, aborted) {
            (Some(_), _) => Outcome::Failed,
            (None, true) => Outcome::Aborted,
            (None, false) => Outcome::Completed,
        };

        for (name, frame) in frames[..entered].iter_mut().rev() {
            match guard(|| frame.exit(cx, outcome)) {
                Ok(()) => {}
                Err(Failure::Abort(_)) => log::debug!("{} raised abort from exit()", name),
                Err(err) => {
                    if failure.is_none() {
                        failure = Some(err);
                    } else {
                        log::warn!("{} failed in exit() after an earlier failure: {}", name, err);
                    }
                }
            }
        }

        self.state = match (&failure, aborted) {
            (Some(_), _) => PipelineState::Failed,
            (None, true) => PipelineState::Aborted,
            (None, false) => PipelineState::Completed,
        };

        match failure {
            Some(err) => Err(err),
            None => Ok(self.state),
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("middleware", &self.middleware.len())
            .field("handler", &self.handler)
            .field("state", &self.state)
            .finish()
    }
}

/// Run one link, turning a panic into an internal failure
fn guard<T>(f: impl FnOnce() -> Result<T, Failure>) -> Result<T, Failure> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(Failure::Internal(anyhow::anyhow!("panic: {}", message)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::error::HttpError;
    use crate::http::{HttpRequest, HttpResponse, RawRequest};
    use crate::pipeline::middleware;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
        abort_on_enter: bool,
        fail_on_exit: bool,
    }

    impl Interceptor for Recorder {
        fn enter(&mut self, _cx: &mut RequestContext<'_>) -> Result<(), Failure> {
            self.log.lock().unwrap().push(format!("{}.enter", self.name));
            if self.abort_on_enter {
                return Err(Failure::abort());
            }
            Ok(())
        }

        fn exit(&mut self, _cx: &mut RequestContext<'_>, outcome: Outcome) -> Result<(), Failure> {
            self.log.lock().unwrap().push(format!("{}.exit({:?})", self.name, outcome));
            if self.fail_on_exit {
                return Err(HttpError::forbidden().into());
            }
            Ok(())
        }
    }

    fn recorder(name: &'static str, log: &Log, abort_on_enter: bool, fail_on_exit: bool) -> Middleware {
        let log = Arc::clone(log);
        middleware(move |_: &App, _: &HttpRequest, _: &HttpResponse| {
            Box::new(Recorder { name, log: Arc::clone(&log), abort_on_enter, fail_on_exit })
                as Box<dyn Interceptor>
        })
    }

    fn recording_handler(log: &Log) -> Handler {
        let log = Arc::clone(log);
        Handler::new(move |_| {
            log.lock().unwrap().push("H".to_string());
            Ok("body")
        })
    }

    fn run(pipeline: &mut Pipeline) -> (Result<PipelineState, Failure>, HttpResponse) {
        let app = App::new();
        let mut request = HttpRequest::new(RawRequest::new("GET", "/"), Default::default());
        let mut response = HttpResponse::new();
        let result = {
            let mut cx = RequestContext::new(&app, &mut request, &mut response);
            pipeline.run(&mut cx)
        };
        (result, response)
    }

    #[test]
    fn test_normal_order() {
        let log: Log = Default::default();
        let mut pipeline = Pipeline::new(
            vec![recorder("A", &log, false, false), recorder("B", &log, false, false)],
            recording_handler(&log),
        );

        let (result, response) = run(&mut pipeline);
        assert_eq!(result.unwrap(), PipelineState::Completed);
        assert_eq!(response.body_text().unwrap(), "body");
        assert_eq!(
            *log.lock().unwrap(),
            vec!["A.enter", "B.enter", "H", "B.exit(Completed)", "A.exit(Completed)"]
        );
    }

    #[test]
    fn test_abort_skips_handler_and_own_exit() {
        let log: Log = Default::default();
        let mut pipeline = Pipeline::new(
            vec![recorder("A", &log, false, false), recorder("B", &log, true, false)],
            recording_handler(&log),
        );

        let (result, _) = run(&mut pipeline);
        assert_eq!(result.unwrap(), PipelineState::Aborted);
        assert_eq!(pipeline.state(), PipelineState::Aborted);
        assert_eq!(*log.lock().unwrap(), vec!["A.enter", "B.enter", "A.exit(Aborted)"]);
    }

    #[test]
    fn test_handler_failure_still_runs_exits() {
        let log: Log = Default::default();
        let mut pipeline = Pipeline::new(
            vec![recorder("A", &log, false, false)],
            Handler::new(|_| -> Result<String, Failure> { Err(anyhow::anyhow!("boom").into()) }),
        );

        let (result, _) = run(&mut pipeline);
        assert!(matches!(result, Err(Failure::Internal(_))));
        assert_eq!(pipeline.state(), PipelineState::Failed);
        assert_eq!(*log.lock().unwrap(), vec!["A.enter", "A.exit(Failed)"]);
    }

    #[test]
    fn test_panic_becomes_internal_failure() {
        let log: Log = Default::default();
        let mut pipeline = Pipeline::new(
            vec![recorder("A", &log, false, false)],
            Handler::new(|_| -> Result<String, Failure> { panic!("handler exploded") }),
        );

        let (result, _) = run(&mut pipeline);
        match result {
            Err(Failure::Internal(err)) => assert!(err.to_string().contains("handler exploded")),
            other => panic!("expected internal failure, got {:?}", other),
        }
        assert_eq!(*log.lock().unwrap(), vec!["A.enter", "A.exit(Failed)"]);
    }

    #[test]
    fn test_factory_panic_skips_every_frame() {
        let log: Log = Default::default();
        let exploding = middleware(|_: &App, _: &HttpRequest, _: &HttpResponse| -> Box<dyn Interceptor> {
            panic!("factory exploded")
        });
        let mut pipeline = Pipeline::new(
            vec![recorder("A", &log, false, false), exploding, recorder("B", &log, false, false)],
            recording_handler(&log),
        );

        let (result, _) = run(&mut pipeline);
        match result {
            Err(Failure::Internal(err)) => assert!(err.to_string().contains("factory exploded")),
            other => panic!("expected internal failure, got {:?}", other),
        }
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(pipeline.state(), PipelineState::Failed);
    }

    #[test]
    fn test_first_exit_failure_wins() {
        let log: Log = Default::default();
        let mut pipeline = Pipeline::new(
            vec![recorder("A", &log, false, true), recorder("B", &log, false, false)],
            recording_handler(&log),
        );

        let (result, _) = run(&mut pipeline);
        match result {
            Err(Failure::Http(err)) => assert_eq!(err.status.code(), 403),
            other => panic!("expected 403, got {:?}", other),
        }
        assert_eq!(log.lock().unwrap().len(), 5);
    }

    #[test]
    fn test_handler_abort_is_not_a_failure() {
        let mut pipeline = Pipeline::new(
            Vec::new(),
            Handler::new(|cx| -> Result<String, Failure> {
                cx.response.set_body("partial");
                Err(Failure::abort())
            }),
        );

        let (result, response) = run(&mut pipeline);
        assert_eq!(result.unwrap(), PipelineState::Aborted);
        assert_eq!(response.body_text().unwrap(), "partial");
    }
}
