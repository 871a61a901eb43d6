//! Adapters between `lamb` handlers and the calls the Lambda runtime makes.
//!
//! There are two policies:
//! - [`RequestDispatcher`] always produces a response. Handler errors are classified and turned
//!   into an error response, the invocation itself never fails.
//! - [`BatchDispatcher`] processes records one by one in delivery order and stops at the first
//!   handler error, returning it to the runtime so that the whole batch is redelivered.
//!   There is no partial batch reporting, records processed before the failure are processed again
//!   on redelivery, so handlers must be safe to retry.
//!
//! Handlers are async functions taking the [`Context`] by value.

use crate::classify::classify;
use crate::context::Context;
use crate::error::Error;
use crate::events::{BatchEvent, TriggerRecord};
use crate::response::{self, Response};
use lambda_runtime::{Context as LambdaContext, LambdaEvent};
use std::future::Future;
use std::marker::PhantomData;
use tracing::instrument::WithSubscriber;
use tracing::{debug, info_span, warn, Dispatch, Instrument};

/// Runs a handler for a single request-shaped record and always returns a response.
pub struct RequestDispatcher<R, H> {
    handler: H,
    logger: Option<Dispatch>,
    _record: PhantomData<fn(R)>,
}

impl<R, H> RequestDispatcher<R, H>
where
    R: TriggerRecord,
{
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            logger: None,
            _record: PhantomData,
        }
    }

    /// Sends all log events of this dispatcher to `logger` instead of the global default subscriber.
    pub fn with_logger(mut self, logger: impl Into<Dispatch>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    /// Handles one invocation. The returned response is either the one written by the handler
    /// or the classified error if the handler failed.
    pub async fn handle<Fut>(&self, event: LambdaEvent<R>) -> Response
    where
        H: Fn(Context<R>) -> Fut,
        Fut: Future<Output = Result<(), Error>>,
    {
        let (record, lambda) = event.into_parts();
        with_logger(self.logger.as_ref(), self.invoke(record, lambda)).await
    }

    async fn invoke<Fut>(&self, record: R, lambda: LambdaContext) -> Response
    where
        H: Fn(Context<R>) -> Fut,
        Fut: Future<Output = Result<(), Error>>,
    {
        let span = info_span!(
            "invocation",
            trigger = R::TRIGGER,
            request_id = %lambda.request_id,
            operation = %record.describe_operation(),
        );

        let ctx = Context::new(record, lambda, span.clone());
        let written = ctx.response_slot();
        let outcome = (self.handler)(ctx).instrument(span.clone()).await;

        match outcome {
            Ok(()) => written.take(),
            Err(e) => {
                let _entered = span.enter();
                // whatever the handler wrote before failing is dropped with the slot
                let classified = classify(&e);
                debug!("Handler failed with {classified}");
                response::json(classified.status, &classified)
            }
        }
    }
}

/// Runs a handler for every record of a batch, in order, stopping at the first failure.
pub struct BatchDispatcher<E, H> {
    handler: H,
    logger: Option<Dispatch>,
    _event: PhantomData<fn(E)>,
}

impl<E, H> BatchDispatcher<E, H>
where
    E: BatchEvent,
{
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            logger: None,
            _event: PhantomData,
        }
    }

    /// Sends all log events of this dispatcher to `logger` instead of the global default subscriber.
    pub fn with_logger(mut self, logger: impl Into<Dispatch>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    /// Handles one invocation.
    /// Returns the error of the first failed record as is, after logging it.
    pub async fn handle<Fut>(&self, event: LambdaEvent<E>) -> Result<(), Error>
    where
        H: Fn(Context<E::Record>) -> Fut,
        Fut: Future<Output = Result<(), Error>>,
    {
        let (event, lambda) = event.into_parts();
        with_logger(self.logger.as_ref(), self.process(event.into_records(), lambda)).await
    }

    async fn process<Fut>(&self, records: Vec<E::Record>, lambda: LambdaContext) -> Result<(), Error>
    where
        H: Fn(Context<E::Record>) -> Fut,
        Fut: Future<Output = Result<(), Error>>,
    {
        let total = records.len();

        for (index, record) in records.into_iter().enumerate() {
            let span = info_span!(
                "record",
                trigger = <E::Record as TriggerRecord>::TRIGGER,
                request_id = %lambda.request_id,
                index,
                operation = %record.describe_operation(),
            );

            let ctx = Context::new(record, lambda.clone(), span.clone());

            if let Err(e) = (self.handler)(ctx).instrument(span.clone()).await {
                let _entered = span.enter();
                let classified = classify(&e);
                warn!(
                    code = %classified.code,
                    "Record {} of {total} failed, aborting the batch with {} records left",
                    index + 1,
                    total - index - 1
                );
                return Err(e);
            }
        }

        debug!("Processed {total} records");
        Ok(())
    }
}

/// Runs `f` with `logger` as the default subscriber while it is polled, if there is one.
async fn with_logger<F: Future>(logger: Option<&Dispatch>, f: F) -> F::Output {
    match logger {
        Some(dispatch) => f.with_subscriber(dispatch.clone()).await,
        None => f.await,
    }
}
