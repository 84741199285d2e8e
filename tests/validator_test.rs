use anyhow::Result;
use mechanic_shop::core::validator::{self, attempt, Attempt, FieldCollector, FieldSpec, TextField};
use mechanic_shop::domain::model::OutputFormat;
use mechanic_shop::utils::error::{ReferenceError, ShopError};
use mechanic_shop::TerminalConsole;
use std::io::Cursor;

fn console(script: &str) -> TerminalConsole<Cursor<String>, Vec<u8>> {
    TerminalConsole::new(Cursor::new(script.to_string()), Vec::new(), OutputFormat::Tsv)
}

#[test]
fn test_every_bounded_text_field_enforces_its_limits() {
    let fields: [(TextField, usize); 10] = [
        (validator::CUSTOMER_FNAME, 32),
        (validator::CUSTOMER_LNAME, 32),
        (validator::CUSTOMER_PHONE, 13),
        (validator::CUSTOMER_ADDRESS, 256),
        (validator::MECHANIC_FNAME, 32),
        (validator::MECHANIC_LNAME, 32),
        (validator::CAR_VIN, 16),
        (validator::CAR_MAKE, 32),
        (validator::CAR_MODEL, 32),
        (validator::REQUEST_CAR_VIN, 16),
    ];

    for (field, max) in fields {
        assert_eq!(field.max, max);
        assert!(field.check("").is_err(), "{}: empty accepted", field.name);
        assert!(field.check("x").is_ok(), "{}: 1 char rejected", field.name);
        assert!(
            field.check(&"x".repeat(max)).is_ok(),
            "{}: {} chars rejected",
            field.name,
            max
        );
        assert!(
            field.check(&"x".repeat(max + 1)).is_err(),
            "{}: {} chars accepted",
            field.name,
            max + 1
        );
    }
}

#[test]
fn test_numeric_boundaries() {
    assert!(matches!(attempt(&validator::CAR_YEAR, "1969"), Attempt::Reprompt(_)));
    assert_eq!(attempt(&validator::CAR_YEAR, "1970"), Attempt::Accepted(1970));

    assert!(matches!(attempt(&validator::REQUEST_ODOMETER, "0"), Attempt::Reprompt(_)));
    assert!(matches!(attempt(&validator::REQUEST_ODOMETER, "-10"), Attempt::Reprompt(_)));
    assert_eq!(attempt(&validator::REQUEST_ODOMETER, "1"), Attempt::Accepted(1));

    assert!(matches!(attempt(&validator::CLOSE_BILL, "-1"), Attempt::Reprompt(_)));
    assert_eq!(attempt(&validator::CLOSE_BILL, "0"), Attempt::Accepted(0));
}

#[test]
fn test_free_text_accepts_empty() {
    assert_eq!(
        attempt(&validator::REQUEST_COMPLAINT, ""),
        Attempt::Accepted(String::new())
    );
    assert_eq!(
        attempt(&validator::CLOSE_COMMENT, "tabs\tand 'quotes'"),
        Attempt::Accepted("tabs\tand 'quotes'".to_string())
    );
}

#[test]
fn test_collector_reprompts_until_number_parses() -> Result<()> {
    let mut console = console("abc\n\n12.5\n42\n");
    let value = FieldCollector::new(&mut console).collect(&validator::CUSTOMER_ID)?;
    assert_eq!(value, 42);

    let (_, out) = console.into_inner();
    let out = String::from_utf8(out)?;
    assert_eq!(out.matches("Enter customer id: ").count(), 4);
    assert_eq!(out.matches("Customer id must be a whole number").count(), 3);
    Ok(())
}

#[test]
fn test_collector_reports_concrete_reason() -> Result<()> {
    let mut console = console("1969\n2004\n");
    let year = FieldCollector::new(&mut console).collect(&validator::CAR_YEAR)?;
    assert_eq!(year, 2004);

    let out = String::from_utf8(console.into_inner().1)?;
    assert!(out.contains("Year must be at least 1970"));
    Ok(())
}

#[test]
fn test_date_with_wrong_separators_is_rejected() -> Result<()> {
    // 10 characters, but not YYYY-MM-DD
    let mut console = console("2024/03/05\n2024-3-5xx\n2024-03-05\n");
    let date = FieldCollector::new(&mut console).collect(&validator::REQUEST_DATE)?;
    assert_eq!(date.to_string(), "2024-03-05");

    let out = String::from_utf8(console.into_inner().1)?;
    assert_eq!(out.matches("Date must be a date in the format YYYY-MM-DD").count(), 2);
    Ok(())
}

#[test]
fn test_guard_rejection_reprompts_same_field() -> Result<()> {
    let mut console = console("5\n6\n");
    let mid = FieldCollector::new(&mut console)
        .collect_with(&validator::CLOSE_MECHANIC_ID, |mid| {
            if *mid == 5 {
                return Err(ReferenceError::not_found("Mechanic", mid).into());
            }
            Ok(())
        })?;
    assert_eq!(mid, 6);

    let out = String::from_utf8(console.into_inner().1)?;
    assert!(out.contains("Mechanic 5 does not exist"));
    Ok(())
}

#[test]
fn test_guard_store_failure_aborts() {
    let mut console = console("5\n6\n");
    let result = FieldCollector::new(&mut console).collect_with(&validator::MECHANIC_ID, |_| {
        Err(ShopError::ProcessingError {
            message: "store unavailable".to_string(),
        })
    });
    assert!(matches!(result, Err(ShopError::ProcessingError { .. })));
}

#[test]
fn test_end_of_input_ends_collection() {
    let mut console = console("not-a-number\n");
    let result = FieldCollector::new(&mut console).collect(&validator::MECHANIC_EXPERIENCE);
    assert!(matches!(result, Err(ShopError::InputClosed)));
}
