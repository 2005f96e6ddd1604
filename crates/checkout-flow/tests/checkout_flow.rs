//! End-to-end flow scenarios against the in-memory page.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use checkout_core_types::{CardData, CustomerData, Outcome, Salutation, UiError};
use checkout_flow::{CheckoutFlow, FlowHooks, FlowOpts, FlowState, NoopHooks, OutcomeOpts};
use field_locator::ResolverOpts;
use form_primitives::ActorOpts;
use page_port::fake::{FakeDoc, FakeElement, FakePage};
use page_port::{FrameContext, PagePort, WaitOpts};

fn fast_opts() -> FlowOpts {
    FlowOpts {
        actor: ActorOpts {
            wait: WaitOpts::new(Duration::from_millis(10), Duration::from_millis(100)),
            settle: Duration::from_millis(1),
            resolver: ResolverOpts {
                strategy_budget: Duration::from_millis(50),
                poll_interval: Duration::from_millis(10),
            },
        },
        form_wait: WaitOpts::new(Duration::from_millis(10), Duration::from_millis(100)),
        frame_probe_timeout: Duration::from_millis(50),
        submit_timeout: Duration::from_millis(50),
        outcome_deadline: Duration::from_millis(150),
        outcome: OutcomeOpts {
            poll_interval: Duration::from_millis(10),
            text_wait: WaitOpts::new(Duration::from_millis(10), Duration::from_millis(50)),
        },
    }
}

fn customer() -> CustomerData {
    CustomerData {
        email: "testuser@example.com".into(),
        salutation: Some(Salutation::Mr),
        first_name: "Max".into(),
        last_name: "Mustermann".into(),
        zip_code: "12345".into(),
        city: "Berlin".into(),
        street: "Teststraße 2".into(),
        country_label: Some("Deutschland".into()),
    }
}

fn card() -> CardData {
    CardData::new("Max Mustermann", "4635440000002298", "123", "12", "2026").unwrap()
}

/// Node handles of the customer-form part of the fixture page.
struct CustomerForm {
    email: u64,
    salutation: u64,
    street: u64,
    holder: u64,
}

/// Customer form, cardholder field and the three buttons, all top-level.
fn customer_doc(with_salutation: bool) -> (FakeDoc, CustomerForm) {
    let mut doc = FakeDoc::new();
    doc.push(FakeElement::new("label").attr("for", "email").text("E-Mail"));
    let email = doc.push(FakeElement::new("input").attr("id", "email"));

    let salutation = if with_salutation {
        doc.push(FakeElement::new("label").attr("for", "sal").text("Anrede"));
        doc.push(
            FakeElement::new("select")
                .attr("id", "sal")
                .options(&["Herr", "Frau"]),
        )
    } else {
        u64::MAX
    };

    doc.push(FakeElement::new("label").attr("for", "fn").text("Vorname"));
    doc.push(FakeElement::new("input").attr("id", "fn"));
    doc.push(FakeElement::new("label").attr("for", "ln").text("Nachname"));
    doc.push(FakeElement::new("input").attr("id", "ln"));
    doc.push(FakeElement::new("label").attr("for", "zip").text("PLZ"));
    doc.push(FakeElement::new("input").attr("id", "zip"));
    doc.push(FakeElement::new("label").attr("for", "city").text("Ort"));
    doc.push(FakeElement::new("input").attr("id", "city"));
    doc.push(FakeElement::new("label").attr("for", "street").text("Adresse"));
    let street = doc.push(FakeElement::new("input").attr("id", "street"));
    doc.push(FakeElement::new("label").attr("for", "country").text("Land"));
    doc.push(
        FakeElement::new("select")
            .attr("id", "country")
            .options(&["Deutschland", "Österreich"]),
    );

    doc.push(FakeElement::new("button").text("Weiter"));

    doc.push(
        FakeElement::new("label")
            .attr("for", "holder")
            .text("Karteninhaber"),
    );
    let holder = doc.push(FakeElement::new("input").attr("id", "holder"));

    doc.push(FakeElement::new("button").text("Jetzt zahlen"));

    (
        doc,
        CustomerForm {
            email,
            salutation,
            street,
            holder,
        },
    )
}

fn card_frame() -> (FakeDoc, u64, u64, u64) {
    let mut doc = FakeDoc::new();
    let number = doc.push(FakeElement::new("input").attr("id", "card-number"));
    let expiry = doc.push(FakeElement::new("input").attr("placeholder", "MM/YY"));
    let cvv = doc.push(FakeElement::new("input").attr("id", "cardCvv"));
    (doc, number, expiry, cvv)
}

#[tokio::test]
async fn full_flow_with_card_fields_in_iframe() {
    let (mut top, form) = customer_doc(true);
    let submit = doc_submit(&mut top);
    let (frame, number, expiry, cvv) = card_frame();
    let page = Arc::new(FakePage::with_frames(top, vec![frame]));
    page.on_click_set_url(
        FrameContext::Top,
        submit,
        "https://shop.example/return/SUCCESS",
    );

    let mut flow = CheckoutFlow::with_opts(
        Arc::clone(&page) as Arc<dyn PagePort>,
        Arc::new(NoopHooks),
        fast_opts(),
    );
    let outcome = flow.run(&customer(), &card()).await.unwrap();

    assert_eq!(outcome, Outcome::SuccessUrl);
    assert_eq!(flow.state(), FlowState::Done);
    assert_eq!(flow.report().outcome, Some(Outcome::SuccessUrl));

    assert_eq!(
        page.value_of(FrameContext::Top, form.email),
        "testuser@example.com"
    );
    assert_eq!(page.value_of(FrameContext::Top, form.street), "Teststraße 2");
    assert_eq!(
        page.selected_of(FrameContext::Top, form.salutation),
        Some("Herr".to_string())
    );
    assert_eq!(
        page.value_of(FrameContext::Top, form.holder),
        "Max Mustermann"
    );
    assert_eq!(
        page.value_of(FrameContext::Frame(0), number),
        "4635440000002298"
    );
    assert_eq!(page.value_of(FrameContext::Frame(0), expiry), "12/26");
    assert_eq!(page.value_of(FrameContext::Frame(0), cvv), "123");
}

fn doc_submit(doc: &mut FakeDoc) -> u64 {
    doc.push(
        FakeElement::new("button")
            .attr("type", "submit")
            .text("Bezahlen"),
    )
}

#[tokio::test]
async fn card_fields_top_level_with_text_submit_fallback() {
    let (mut top, _form) = customer_doc(true);
    let number = top.push(FakeElement::new("input").attr("id", "card-number"));
    top.push(FakeElement::new("input").attr("placeholder", "MM/YY"));
    top.push(FakeElement::new("input").attr("id", "cardCvv"));
    // No typed submit control, only the text fallback.
    let submit = top.push(FakeElement::new("button").text("Bezahlen"));
    let page = Arc::new(FakePage::new(top));
    page.on_click_set_url(
        FrameContext::Top,
        submit,
        "https://shop.example/return/SUCCESS",
    );

    let mut flow = CheckoutFlow::with_opts(
        Arc::clone(&page) as Arc<dyn PagePort>,
        Arc::new(NoopHooks),
        fast_opts(),
    );
    let outcome = flow.run(&customer(), &card()).await.unwrap();

    assert_eq!(outcome, Outcome::SuccessUrl);
    assert_eq!(
        page.value_of(FrameContext::Top, number),
        "4635440000002298"
    );
}

#[tokio::test]
async fn split_expiry_ids_are_used_when_no_combined_field_matches() {
    let (mut top, _form) = customer_doc(true);
    let submit = doc_submit(&mut top);
    let mut frame = FakeDoc::new();
    frame.push(FakeElement::new("input").attr("id", "card-number"));
    // Split month/year rendered as selects: the combined text-entry
    // resolution cannot match them, forcing the fixed-id fallback.
    let month = frame.push(FakeElement::new("select").attr("id", "exp-date"));
    let year = frame.push(FakeElement::new("select").attr("id", "expiryYear"));
    frame.push(FakeElement::new("input").attr("id", "cardCvv"));
    let page = Arc::new(FakePage::with_frames(top, vec![frame]));
    page.on_click_set_url(
        FrameContext::Top,
        submit,
        "https://shop.example/return/SUCCESS",
    );

    let mut flow = CheckoutFlow::with_opts(
        Arc::clone(&page) as Arc<dyn PagePort>,
        Arc::new(NoopHooks),
        fast_opts(),
    );
    flow.run(&customer(), &card()).await.unwrap();

    assert_eq!(page.value_of(FrameContext::Frame(0), month), "12");
    assert_eq!(page.value_of(FrameContext::Frame(0), year), "2026");
}

#[tokio::test]
async fn missing_optional_fields_do_not_abort() {
    let (mut top, _form) = customer_doc(false);
    let submit = doc_submit(&mut top);
    let (frame, ..) = card_frame();
    let page = Arc::new(FakePage::with_frames(top, vec![frame]));
    page.on_click_set_url(
        FrameContext::Top,
        submit,
        "https://shop.example/return/SUCCESS",
    );

    let mut flow = CheckoutFlow::with_opts(
        page as Arc<dyn PagePort>,
        Arc::new(NoopHooks),
        fast_opts(),
    );
    let outcome = flow.run(&customer(), &card()).await.unwrap();
    assert_eq!(outcome, Outcome::SuccessUrl);
}

#[derive(Default)]
struct RecordingHooks {
    customer: AtomicBool,
    payment: AtomicBool,
    failures: Mutex<Vec<(FlowState, String)>>,
}

#[async_trait]
impl FlowHooks for RecordingHooks {
    async fn after_customer_form(&self) {
        self.customer.store(true, Ordering::SeqCst);
    }

    async fn after_payment_form(&self) {
        self.payment.store(true, Ordering::SeqCst);
    }

    async fn on_failure(&self, state: FlowState, error: &UiError) {
        self.failures
            .lock()
            .unwrap()
            .push((state, error.to_string()));
    }
}

#[tokio::test]
async fn hooks_fire_at_fixed_points() {
    let (mut top, _form) = customer_doc(true);
    let submit = doc_submit(&mut top);
    let (frame, ..) = card_frame();
    let page = Arc::new(FakePage::with_frames(top, vec![frame]));
    page.on_click_set_url(
        FrameContext::Top,
        submit,
        "https://shop.example/return/SUCCESS",
    );

    let hooks = Arc::new(RecordingHooks::default());
    let mut flow = CheckoutFlow::with_opts(
        page as Arc<dyn PagePort>,
        Arc::clone(&hooks) as Arc<dyn FlowHooks>,
        fast_opts(),
    );
    flow.run(&customer(), &card()).await.unwrap();

    assert!(hooks.customer.load(Ordering::SeqCst));
    assert!(hooks.payment.load(Ordering::SeqCst));
    assert!(hooks.failures.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_mandatory_field_aborts_and_reports() {
    // A form marker exists but there is no email field at all.
    let mut top = FakeDoc::new();
    top.push(FakeElement::new("label").attr("for", "fn").text("Vorname"));
    top.push(FakeElement::new("input").attr("id", "fn"));
    let page = Arc::new(FakePage::new(top));

    let hooks = Arc::new(RecordingHooks::default());
    let mut flow = CheckoutFlow::with_opts(
        page as Arc<dyn PagePort>,
        Arc::clone(&hooks) as Arc<dyn FlowHooks>,
        fast_opts(),
    );
    let err = flow.run(&customer(), &card()).await.unwrap_err();

    assert!(matches!(err, UiError::ElementNotFound { .. }));
    assert_eq!(flow.state(), FlowState::CustomerFormVisible);
    assert!(flow.report().error.is_some());

    let failures = hooks.failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, FlowState::CustomerFormVisible);
    assert!(!hooks.customer.load(Ordering::SeqCst));
}
