use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub u64);

/// The two independent keys a customer is addressable by. The backing
/// store does not guarantee the two indexes agree, which is why quotation
/// resolution tries them in order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerKeys {
    pub email: Option<String>,
    pub customer_id: Option<CustomerId>,
}

impl CustomerKeys {
    pub fn by_email(email: impl Into<String>) -> Self {
        Self { email: Some(email.into()), customer_id: None }
    }

    pub fn by_customer_id(customer_id: CustomerId) -> Self {
        Self { email: None, customer_id: Some(customer_id) }
    }

    /// Email key, with blank values treated as absent.
    pub fn email_key(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|email| !email.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{CustomerId, CustomerKeys};

    #[test]
    fn blank_email_is_not_a_usable_key() {
        let keys = CustomerKeys { email: Some("   ".to_string()), customer_id: None };
        assert_eq!(keys.email_key(), None);
    }

    #[test]
    fn email_key_is_trimmed() {
        let keys = CustomerKeys::by_email(" ada@example.com ");
        assert_eq!(keys.email_key(), Some("ada@example.com"));
        assert_eq!(keys.customer_id, None);
    }

    #[test]
    fn customer_id_only_keys_have_no_email() {
        let keys = CustomerKeys::by_customer_id(CustomerId(42));
        assert_eq!(keys.email_key(), None);
        assert_eq!(keys.customer_id, Some(CustomerId(42)));
    }
}
