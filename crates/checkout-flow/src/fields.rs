//! Field descriptors and button synonyms for the hosted checkout page.
//!
//! Candidate lists cover the German-first checkout UI with English
//! fallbacks; descriptor order is priority order.

use checkout_core_types::{CardData, CustomerData, FieldDescriptor};

/// Localized synonyms of the customer-form continue control.
pub const CONTINUE_TEXTS: [&str; 4] = ["Weiter", "Fortfahren", "Continue", "Next"];

/// The pay-now control after the card form.
pub const PAY_NOW_TEXTS: [&str; 1] = ["Jetzt zahlen"];

/// Text fallbacks when no control of type `submit` exists.
pub const SUBMIT_FALLBACK_TEXTS: [&str; 3] = ["Bezahlen", "Pay", "Zahlung"];

/// Fixed element ids of the split expiry fields some payment forms use
/// instead of a combined `MM/YY` input.
pub const EXPIRY_MONTH_ID: &str = "exp-date";
pub const EXPIRY_YEAR_ID: &str = "expiryYear";

/// All descriptors for one run, constructed once from the immutable value
/// records and read-only thereafter.
pub struct CheckoutFields {
    pub email: FieldDescriptor,
    /// Best-effort; `None` when no salutation was configured.
    pub salutation: Option<FieldDescriptor>,
    pub first_name: FieldDescriptor,
    pub last_name: FieldDescriptor,
    pub zip_code: FieldDescriptor,
    pub city: FieldDescriptor,
    pub street: FieldDescriptor,
    /// Best-effort; `None` when no country label was configured.
    pub country: Option<FieldDescriptor>,

    pub card_holder: FieldDescriptor,
    pub card_number: FieldDescriptor,
    /// Combined `MM/YY` entry, attempted before the split-id fallback.
    pub expiry: FieldDescriptor,
    pub cvv: FieldDescriptor,

    /// Raw expiry parts for the split-id fallback.
    pub expiry_month: String,
    pub expiry_year: String,
}

impl CheckoutFields {
    pub fn for_run(customer: &CustomerData, card: &CardData) -> Self {
        let labels = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            email: FieldDescriptor::new(
                "email",
                labels(&["E-Mail", "E-Mail-Adresse", "Email", "E-Mail *"]),
                labels(&["e-mail", "email"]),
                &customer.email,
            ),
            salutation: customer.salutation.map(|sal| {
                FieldDescriptor::new(
                    "salutation",
                    labels(&["Anrede", "Titel", "Anrede/Titel"]),
                    vec![],
                    sal.option_text(),
                )
            }),
            first_name: FieldDescriptor::new(
                "first name",
                labels(&["Vorname"]),
                labels(&["vorname", "first"]),
                &customer.first_name,
            ),
            last_name: FieldDescriptor::new(
                "last name",
                labels(&["Nachname"]),
                labels(&["nachname", "last"]),
                &customer.last_name,
            ),
            zip_code: FieldDescriptor::new(
                "zip code",
                labels(&["PLZ", "Postleitzahl"]),
                labels(&["plz", "zip"]),
                &customer.zip_code,
            ),
            city: FieldDescriptor::new(
                "city",
                labels(&["Ort", "Stadt"]),
                labels(&["city", "ort"]),
                &customer.city,
            ),
            street: FieldDescriptor::new(
                "street",
                labels(&["Straße, Hausnummer", "Adresse"]),
                labels(&["street", "adresse"]),
                &customer.street,
            ),
            country: customer.country_label.as_ref().map(|country| {
                FieldDescriptor::new("country", labels(&["Land"]), vec![], country)
            }),
            card_holder: FieldDescriptor::new(
                "card holder",
                labels(&["Karteninhaber", "Karteninhaber/in", "Name auf Karte"]),
                labels(&["karteninhaber", "cardholder", "holder", "name"]),
                &card.holder,
            ),
            card_number: FieldDescriptor::new(
                "card number",
                vec![],
                labels(&["card-number", "cardnumber", "card number", "kartennummer"]),
                &card.number,
            )
            .sensitive(),
            expiry: FieldDescriptor::new(
                "expiry",
                vec![],
                labels(&["exp-date", "expiry", "mm"]),
                card.expiry_mm_yy(),
            ),
            cvv: FieldDescriptor::new(
                "cvv",
                vec![],
                labels(&["cardcvv", "cvc", "cvv"]),
                &card.cvv,
            )
            .sensitive(),
            expiry_month: card.expiry_month().to_string(),
            expiry_year: card.expiry_year().to_string(),
        }
    }
}
