use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use checkout_core_types::{CardData, CustomerData, Outcome, UiError};
use form_primitives::{ActorOpts, FormActor};
use frame_navigator::FrameNavigator;
use page_port::{wait_until, FrameContext, PagePort, WaitOpts};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::fields::{
    CheckoutFields, CONTINUE_TEXTS, EXPIRY_MONTH_ID, EXPIRY_YEAR_ID, PAY_NOW_TEXTS,
    SUBMIT_FALLBACK_TEXTS,
};
use crate::hooks::FlowHooks;
use crate::outcome::{OutcomeClassifier, OutcomeOpts};
use crate::report::{FlowReport, FlowState, StepRecord};

#[derive(Debug, Clone, Copy)]
pub struct FlowOpts {
    pub actor: ActorOpts,
    /// Wait for the first recognizable marker of the customer form.
    pub form_wait: WaitOpts,
    /// Per-frame budget while scanning for the card-number iframe.
    pub frame_probe_timeout: Duration,
    /// Budget for the typed submit control before falling back to text.
    pub submit_timeout: Duration,
    /// Overall deadline for the outcome classifier.
    pub outcome_deadline: Duration,
    pub outcome: OutcomeOpts,
}

impl Default for FlowOpts {
    fn default() -> Self {
        Self {
            actor: ActorOpts::default(),
            form_wait: WaitOpts::default(),
            frame_probe_timeout: Duration::from_secs(10),
            submit_timeout: Duration::from_secs(10),
            outcome_deadline: Duration::from_secs(40),
            outcome: OutcomeOpts::default(),
        }
    }
}

/// Drives one checkout attempt through the linear state machine
/// `Init → CustomerFormVisible → CustomerFormFilled → ContinuedToPayment →
/// PaymentFormFilled → Submitted → OutcomeObserved → Done`.
///
/// Mandatory-step failures abort immediately; retries live inside the
/// primitives' bounded waits, never here. The caller owns the browser
/// session and has already navigated to the checkout URL.
pub struct CheckoutFlow {
    page: Arc<dyn PagePort>,
    actor: FormActor,
    navigator: FrameNavigator,
    classifier: OutcomeClassifier,
    hooks: Arc<dyn FlowHooks>,
    opts: FlowOpts,
    state: FlowState,
    report: FlowReport,
    last_transition: Instant,
}

impl CheckoutFlow {
    pub fn new(page: Arc<dyn PagePort>, hooks: Arc<dyn FlowHooks>) -> Self {
        Self::with_opts(page, hooks, FlowOpts::default())
    }

    pub fn with_opts(page: Arc<dyn PagePort>, hooks: Arc<dyn FlowHooks>, opts: FlowOpts) -> Self {
        let actor = FormActor::with_opts(Arc::clone(&page), opts.actor);
        let navigator = FrameNavigator::with_resolver_opts(Arc::clone(&page), opts.actor.resolver);
        let classifier = OutcomeClassifier::with_opts(Arc::clone(&page), opts.outcome);
        Self {
            page,
            actor,
            navigator,
            classifier,
            hooks,
            opts,
            state: FlowState::Init,
            report: FlowReport::new(Uuid::new_v4().to_string()),
            last_transition: Instant::now(),
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn report(&self) -> &FlowReport {
        &self.report
    }

    /// Run the whole flow once, returning the terminal [`Outcome`].
    pub async fn run(
        &mut self,
        customer: &CustomerData,
        card: &CardData,
    ) -> Result<Outcome, UiError> {
        let fields = CheckoutFields::for_run(customer, card);
        info!(run_id = %self.report.run_id, "checkout flow starting");
        self.last_transition = Instant::now();
        self.transition(FlowState::Init);

        match self.drive(&fields).await {
            Ok(outcome) => {
                self.report.outcome = Some(outcome.clone());
                info!(run_id = %self.report.run_id, %outcome, "checkout flow finished");
                Ok(outcome)
            }
            Err(err) => {
                self.report.error = Some(err.to_string());
                warn!(run_id = %self.report.run_id, state = %self.state, %err, "checkout flow aborted");
                self.hooks.on_failure(self.state, &err).await;
                Err(err)
            }
        }
    }

    async fn drive(&mut self, fields: &CheckoutFields) -> Result<Outcome, UiError> {
        self.await_customer_form().await?;
        self.transition(FlowState::CustomerFormVisible);

        self.fill_customer(fields).await?;
        self.transition(FlowState::CustomerFormFilled);

        self.actor
            .click_by_visible_text(FrameContext::Top, &CONTINUE_TEXTS)
            .await?;
        self.hooks.after_customer_form().await;
        self.transition(FlowState::ContinuedToPayment);

        self.fill_payment(fields).await?;
        self.transition(FlowState::PaymentFormFilled);

        self.actor
            .click_by_visible_text(FrameContext::Top, &PAY_NOW_TEXTS)
            .await?;
        self.hooks.after_payment_form().await;
        self.submit().await?;
        self.transition(FlowState::Submitted);

        let outcome = self.classifier.classify(self.opts.outcome_deadline).await?;
        self.transition(FlowState::OutcomeObserved);
        self.transition(FlowState::Done);
        Ok(outcome)
    }

    /// Any recognizable marker of the customer form is enough here; field
    /// identity is resolved later by the locator engine.
    async fn await_customer_form(&self) -> Result<(), UiError> {
        let page = self.page.as_ref();
        wait_until("customer form", self.opts.form_wait, move || async move {
            let dom = page.snapshot(FrameContext::Top).await?;
            let marker = dom.iter().any(|n| {
                n.is_tag("label")
                    || n.attr("class").map_or(false, |c| c.contains("customer"))
                    || n.text.contains("Kundendaten")
                    || n.text.contains("Customer")
            });
            Ok(marker.then_some(()))
        })
        .await
    }

    async fn fill_customer(&self, fields: &CheckoutFields) -> Result<(), UiError> {
        let top = FrameContext::Top;
        self.actor.enter_text(top, &fields.email).await?;

        if let Some(salutation) = &fields.salutation {
            best_effort("salutation", self.actor.select_option(top, salutation)).await?;
        }

        self.actor.enter_text(top, &fields.first_name).await?;
        self.actor.enter_text(top, &fields.last_name).await?;
        self.actor.enter_text(top, &fields.zip_code).await?;
        self.actor.enter_text(top, &fields.city).await?;
        self.actor.enter_text(top, &fields.street).await?;

        if let Some(country) = &fields.country {
            best_effort("country", self.actor.select_option(top, country)).await?;
        }
        Ok(())
    }

    async fn fill_payment(&mut self, fields: &CheckoutFields) -> Result<(), UiError> {
        // The cardholder field lives outside the provider iframe.
        self.actor
            .enter_text(FrameContext::Top, &fields.card_holder)
            .await?;

        // The card-number probe decides whether the card fields live in an
        // iframe; staying top-level is the legitimate fallback here.
        let in_frame = self
            .navigator
            .enter_frame_containing(&fields.card_number, self.opts.frame_probe_timeout)
            .await?;
        let ctx = self.navigator.context();
        if !in_frame {
            debug!("card fields not inside any iframe, filling top-level");
        }

        self.actor.enter_text(ctx, &fields.card_number).await?;

        match self.actor.enter_text(ctx, &fields.expiry).await {
            Ok(()) => {}
            Err(err) if err.is_recoverable_for_optional_field() => {
                debug!(%err, "no combined expiry field, using split month/year ids");
                self.actor
                    .enter_text_by_id(ctx, EXPIRY_MONTH_ID, "expiry month", &fields.expiry_month, false)
                    .await?;
                self.actor
                    .enter_text_by_id(ctx, EXPIRY_YEAR_ID, "expiry year", &fields.expiry_year, false)
                    .await?;
            }
            Err(err) => return Err(err),
        }

        self.actor.enter_text(ctx, &fields.cvv).await?;

        if in_frame {
            self.navigator.leave_frame();
        }
        Ok(())
    }

    async fn submit(&self) -> Result<(), UiError> {
        let attempt = self
            .actor
            .click_by_control_type(
                FrameContext::Top,
                &["submit"],
                Some(self.opts.submit_timeout),
            )
            .await;
        match attempt {
            Ok(()) => Ok(()),
            Err(err) if err.is_recoverable_for_optional_field() => {
                debug!(%err, "no typed submit control, falling back to text match");
                self.actor
                    .click_by_visible_text(FrameContext::Top, &SUBMIT_FALLBACK_TEXTS)
                    .await
            }
            Err(err) => Err(err),
        }
    }

    fn transition(&mut self, next: FlowState) {
        let elapsed_ms = self.last_transition.elapsed().as_millis() as u64;
        info!(from = %self.state, to = %next, elapsed_ms, "flow transition");
        self.report.steps.push(StepRecord {
            state: next,
            elapsed_ms,
        });
        self.state = next;
        self.last_transition = Instant::now();
    }
}

/// Swallow recoverable failures of optional steps; browser-level failures
/// still abort.
async fn best_effort<T>(
    step: &str,
    attempt: impl Future<Output = Result<T, UiError>>,
) -> Result<Option<T>, UiError> {
    match attempt.await {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_recoverable_for_optional_field() => {
            warn!(step, %err, "optional step skipped");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
