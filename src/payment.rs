use std::collections::HashSet;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PlannerError, Result};
use crate::parser::Family;
use crate::phone::normalize_phone;

/// A ticket payment from the payment processor export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub order_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl PartialEq for Payment {
    fn eq(&self, other: &Self) -> bool {
        self.order_number == other.order_number
    }
}

impl Eq for Payment {}

/// Decodes raw bytes, honouring a UTF-16 or UTF-8 byte order mark
fn decode_text(bytes: &[u8], source: &str) -> Result<String> {
    let (encoding, bom_len) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
    if had_errors {
        return Err(PlannerError::Encoding(source.to_string()));
    }
    Ok(text.into_owned())
}

/// Loads payments from a tab-delimited export file (UTF-16 or UTF-8)
pub fn load_payments<P: AsRef<Path>>(path: P) -> Result<Vec<Payment>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let text = decode_text(&bytes, &path.display().to_string())?;
    parse_payments(&text)
}

/// Parses tab-delimited payment rows. Repeated order numbers keep the first row.
pub fn parse_payments(text: &str) -> Result<Vec<Payment>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| PlannerError::MissingColumn(name.to_string(), "payments"))
    };
    let order_col = column("Order number")?;
    let first_col = column("Guest first name")?;
    let last_col = column("Guest last name")?;
    let email_col = column("Email")?;
    let phone_col = headers.iter().position(|h| h.trim() == "Phone Number");

    let get = |record: &StringRecord, col: Option<usize>| -> String {
        col.and_then(|c| record.get(c)).unwrap_or("").trim().to_string()
    };

    let mut seen = HashSet::new();
    let mut payments = Vec::new();
    for result in reader.records() {
        let record = result?;
        let order_number = get(&record, Some(order_col));
        if order_number.is_empty() {
            continue;
        }
        if !seen.insert(order_number.clone()) {
            warn!(order = %order_number, "duplicate order number in payments");
            continue;
        }
        payments.push(Payment {
            order_number,
            first_name: get(&record, Some(first_col)),
            last_name: get(&record, Some(last_col)),
            email: get(&record, Some(email_col)).to_lowercase(),
            phone: normalize_phone(&get(&record, phone_col)),
        });
    }
    Ok(payments)
}

/// Families whose email appears on a payment
pub fn families_with_payment_email<'a>(families: &'a [Family], payments: &[Payment]) -> Vec<&'a Family> {
    let emails: HashSet<&str> = payments
        .iter()
        .filter(|p| !p.email.is_empty())
        .map(|p| p.email.as_str())
        .collect();
    families
        .iter()
        .filter(|f| emails.contains(f.email.as_str()))
        .collect()
}

/// Families whose phone appears on a payment
pub fn families_with_payment_phone<'a>(families: &'a [Family], payments: &[Payment]) -> Vec<&'a Family> {
    let phones: HashSet<&str> = payments
        .iter()
        .filter(|p| !p.phone.is_empty())
        .map(|p| p.phone.as_str())
        .collect();
    families
        .iter()
        .filter(|f| phones.contains(f.phone.as_str()))
        .collect()
}

/// Families matched by email or phone, in their original order
pub fn families_with_payment<'a>(families: &'a [Family], payments: &[Payment]) -> Vec<&'a Family> {
    let by_email: HashSet<&str> = families_with_payment_email(families, payments)
        .into_iter()
        .map(|f| f.email.as_str())
        .collect();
    let by_phone: HashSet<&str> = families_with_payment_phone(families, payments)
        .into_iter()
        .map(|f| f.email.as_str())
        .collect();
    families
        .iter()
        .filter(|f| by_email.contains(f.email.as_str()) || by_phone.contains(f.email.as_str()))
        .collect()
}

/// Payments belonging to any of the matched families
pub fn matched_payments<'p>(matched: &[&Family], payments: &'p [Payment]) -> Vec<&'p Payment> {
    let emails: HashSet<&str> = matched
        .iter()
        .filter(|f| !f.email.is_empty())
        .map(|f| f.email.as_str())
        .collect();
    let phones: HashSet<&str> = matched
        .iter()
        .filter(|f| !f.phone.is_empty())
        .map(|f| f.phone.as_str())
        .collect();
    payments
        .iter()
        .filter(|p| emails.contains(p.email.as_str()) || phones.contains(p.phone.as_str()))
        .collect()
}

/// Splits families into paid and unpaid, and returns the payments that matched
pub fn match_families_with_payments<'a, 'p>(
    families: &'a [Family],
    payments: &'p [Payment],
) -> (Vec<&'a Family>, Vec<&'p Payment>) {
    let paid = families_with_payment(families, payments);
    let used = matched_payments(&paid, payments);
    (paid, used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn family(email: &str, phone: &str) -> Family {
        Family {
            email: email.to_string(),
            phone: phone.to_string(),
            address: String::new(),
            requests: String::new(),
            submitted: NaiveDate::from_ymd_opt(2025, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap(),
            guests: Vec::new(),
        }
    }

    fn payment(order: &str, email: &str, phone: &str) -> Payment {
        Payment {
            order_number: order.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    fn sample() -> (Vec<Payment>, Vec<Family>) {
        let payments = vec![
            payment("1", "alice@example.com", "1111"),
            payment("2", "bob@example.com", "2222"),
            payment("3", "charlie@example.com", "3333"),
            payment("4", "dug@example.com", "5555"),
        ];
        let families = vec![
            family("alice@example.com", "1111"),
            family("david@example.com", "2222"),
            family("eve@example.com", "4444"),
            family("dug@example.com", "6666"),
        ];
        (payments, families)
    }

    fn emails(families: &[&Family]) -> Vec<String> {
        families.iter().map(|f| f.email.clone()).collect()
    }

    #[test]
    fn test_families_with_payment_email() {
        let (payments, families) = sample();
        let matched = families_with_payment_email(&families, &payments);
        assert_eq!(emails(&matched), vec!["alice@example.com", "dug@example.com"]);
    }

    #[test]
    fn test_families_with_payment_phone() {
        let (payments, families) = sample();
        let matched = families_with_payment_phone(&families, &payments);
        assert_eq!(emails(&matched), vec!["alice@example.com", "david@example.com"]);
    }

    #[test]
    fn test_families_with_payment_union() {
        let (payments, families) = sample();
        let matched = families_with_payment(&families, &payments);
        assert_eq!(
            emails(&matched),
            vec!["alice@example.com", "david@example.com", "dug@example.com"]
        );
    }

    #[test]
    fn test_match_families_with_payments() {
        let (payments, families) = sample();
        let (paid, used) = match_families_with_payments(&families, &payments);

        assert!(paid.iter().all(|f| f.email != "eve@example.com"));
        let orders: Vec<&str> = used.iter().map(|p| p.order_number.as_str()).collect();
        assert_eq!(orders, vec!["1", "2", "4"]);
    }

    #[test]
    fn test_empty_contact_fields_never_match() {
        let payments = vec![payment("1", "", "")];
        let families = vec![family("", "")];
        assert!(families_with_payment(&families, &payments).is_empty());
    }

    #[test]
    fn test_load_payments_utf16() {
        let text = "Order number\tGuest first name\tGuest last name\tEmail\tPhone Number\n\
                    1001\tAlice\tSmith\tAlice@Example.com\t(201) 555-0123\n\
                    1001\tAlice\tSmith\tdup@example.com\t\n\
                    1002\tBob\tJones\tbob@example.com\t\n";
        let mut bytes = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payments.tsv");
        std::fs::write(&path, bytes).unwrap();

        let payments = load_payments(&path).unwrap();

        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].email, "alice@example.com");
        assert_eq!(payments[0].phone, "+12015550123");
        assert_eq!(payments[1].last_name, "Jones");
    }

    #[test]
    fn test_parse_payments_requires_columns() {
        let err = parse_payments("Email\tPhone Number\nx@example.com\t\n").unwrap_err();
        assert!(matches!(err, PlannerError::MissingColumn(ref c, _) if c == "Order number"));
    }
}
