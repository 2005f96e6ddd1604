//! Masking of sensitive field values in diagnostic logs.

use checkout_core_types::FieldDescriptor;

/// Loggable rendering of a descriptor's value.
pub fn render(descriptor: &FieldDescriptor) -> String {
    if descriptor.sensitive {
        mask(&descriptor.value)
    } else {
        descriptor.value.clone()
    }
}

/// PAN-length values keep their last four digits, anything shorter is
/// masked completely.
pub fn mask(value: &str) -> String {
    let len = value.chars().count();
    if len >= 10 {
        let tail: String = value.chars().skip(len - 4).collect();
        format!("{}{tail}", "*".repeat(len - 4))
    } else {
        "*".repeat(len)
    }
}
