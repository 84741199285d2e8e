use crate::domain::ports::Console;
use crate::utils::error::{Result, ShopError, ValidationError};
use chrono::NaiveDate;

/// A prompted field: its prompt text and the check that turns raw input into a typed value.
pub trait FieldSpec {
    type Value;

    fn name(&self) -> &'static str;
    fn prompt(&self) -> &'static str;
    fn check(&self, raw: &str) -> std::result::Result<Self::Value, ValidationError>;
}

/// Text whose length (in characters) must lie in `[1, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextField {
    pub name: &'static str,
    pub prompt: &'static str,
    pub max: usize,
}

impl TextField {
    pub const fn new(name: &'static str, prompt: &'static str, max: usize) -> Self {
        Self { name, prompt, max }
    }
}

impl FieldSpec for TextField {
    type Value = String;

    fn name(&self) -> &'static str {
        self.name
    }

    fn prompt(&self) -> &'static str {
        self.prompt
    }

    fn check(&self, raw: &str) -> std::result::Result<String, ValidationError> {
        let len = raw.chars().count();
        if len < 1 || len > self.max {
            return Err(ValidationError::Length {
                field: self.name,
                min: 1,
                max: self.max,
                actual: len,
            });
        }
        Ok(raw.to_string())
    }
}

/// Unconstrained text; empty input is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeTextField {
    pub name: &'static str,
    pub prompt: &'static str,
}

impl FreeTextField {
    pub const fn new(name: &'static str, prompt: &'static str) -> Self {
        Self { name, prompt }
    }
}

impl FieldSpec for FreeTextField {
    type Value = String;

    fn name(&self) -> &'static str {
        self.name
    }

    fn prompt(&self) -> &'static str {
        self.prompt
    }

    fn check(&self, raw: &str) -> std::result::Result<String, ValidationError> {
        Ok(raw.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerField {
    pub name: &'static str,
    pub prompt: &'static str,
    pub min: Option<i64>,
}

impl IntegerField {
    pub const fn new(name: &'static str, prompt: &'static str) -> Self {
        Self {
            name,
            prompt,
            min: None,
        }
    }

    pub const fn at_least(name: &'static str, prompt: &'static str, min: i64) -> Self {
        Self {
            name,
            prompt,
            min: Some(min),
        }
    }
}

fn parse_integer(field: &'static str, raw: &str) -> std::result::Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::NotANumber { field })
}

impl FieldSpec for IntegerField {
    type Value = i64;

    fn name(&self) -> &'static str {
        self.name
    }

    fn prompt(&self) -> &'static str {
        self.prompt
    }

    fn check(&self, raw: &str) -> std::result::Result<i64, ValidationError> {
        let value = parse_integer(self.name, raw)?;
        match self.min {
            Some(min) if value < min => Err(ValidationError::BelowMinimum {
                field: self.name,
                min,
                actual: value,
            }),
            _ => Ok(value),
        }
    }
}

/// An integer that may be skipped by entering a blank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalIntegerField {
    pub name: &'static str,
    pub prompt: &'static str,
}

impl OptionalIntegerField {
    pub const fn new(name: &'static str, prompt: &'static str) -> Self {
        Self { name, prompt }
    }
}

impl FieldSpec for OptionalIntegerField {
    type Value = Option<i64>;

    fn name(&self) -> &'static str {
        self.name
    }

    fn prompt(&self) -> &'static str {
        self.prompt
    }

    fn check(&self, raw: &str) -> std::result::Result<Option<i64>, ValidationError> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        parse_integer(self.name, raw).map(Some)
    }
}

/// Calendar date written exactly as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateField {
    pub name: &'static str,
    pub prompt: &'static str,
}

impl DateField {
    pub const fn new(name: &'static str, prompt: &'static str) -> Self {
        Self { name, prompt }
    }
}

impl FieldSpec for DateField {
    type Value = NaiveDate;

    fn name(&self) -> &'static str {
        self.name
    }

    fn prompt(&self) -> &'static str {
        self.prompt
    }

    fn check(&self, raw: &str) -> std::result::Result<NaiveDate, ValidationError> {
        let malformed = || ValidationError::MalformedDate { field: self.name };

        // chrono 對位數較寬鬆，先檢查固定版型
        let bytes = raw.as_bytes();
        if bytes.len() != 10 {
            return Err(malformed());
        }
        for (idx, b) in bytes.iter().enumerate() {
            let ok = match idx {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            };
            if !ok {
                return Err(malformed());
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| malformed())
    }
}

/// Outcome of feeding one line of input to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    Accepted(T),
    Reprompt(String),
}

pub fn attempt<F: FieldSpec>(field: &F, raw: &str) -> Attempt<F::Value> {
    match field.check(raw) {
        Ok(value) => Attempt::Accepted(value),
        Err(reason) => Attempt::Reprompt(reason.to_string()),
    }
}

/// Drives the prompt, check, re-prompt loop for one operation.
///
/// The loop ends on an accepted value, on end of input (`ShopError::InputClosed`),
/// or on an error that is not about the entered value (store failures).
pub struct FieldCollector<'c, C: Console + ?Sized> {
    console: &'c mut C,
}

impl<'c, C: Console + ?Sized> FieldCollector<'c, C> {
    pub fn new(console: &'c mut C) -> Self {
        Self { console }
    }

    pub fn collect<F: FieldSpec>(&mut self, field: &F) -> Result<F::Value> {
        self.collect_with(field, |_| Ok(()))
    }

    /// Like [`collect`](Self::collect), but the accepted value must also pass `guard`.
    /// Validation and reference errors from the guard re-prompt; anything else aborts.
    pub fn collect_with<F, G>(&mut self, field: &F, mut guard: G) -> Result<F::Value>
    where
        F: FieldSpec,
        G: FnMut(&F::Value) -> Result<()>,
    {
        loop {
            let raw = match self.console.read_line(field.prompt())? {
                Some(line) => line,
                None => return Err(ShopError::InputClosed),
            };

            let reason = match attempt(field, &raw) {
                Attempt::Accepted(value) => match guard(&value) {
                    Ok(()) => return Ok(value),
                    Err(e) if e.is_recoverable_input() => e.to_string(),
                    Err(e) => return Err(e),
                },
                Attempt::Reprompt(reason) => reason,
            };

            tracing::debug!(field = field.name(), %reason, "input rejected");
            self.console.warn(&reason)?;
        }
    }
}

// 各欄位的限制條件
pub const CUSTOMER_ID: IntegerField = IntegerField::new("Customer id", "Enter customer id: ");
pub const CUSTOMER_FNAME: TextField =
    TextField::new("First name", "Enter customer's first name: ", 32);
pub const CUSTOMER_LNAME: TextField =
    TextField::new("Last name", "Enter customer's last name: ", 32);
pub const CUSTOMER_PHONE: TextField =
    TextField::new("Phone", "Enter customer's phone number: ", 13);
pub const CUSTOMER_ADDRESS: TextField =
    TextField::new("Address", "Enter customer's address: ", 256);

pub const MECHANIC_ID: IntegerField = IntegerField::new("Mechanic id", "Enter mechanic id: ");
pub const MECHANIC_FNAME: TextField =
    TextField::new("First name", "Enter mechanic's first name: ", 32);
pub const MECHANIC_LNAME: TextField =
    TextField::new("Last name", "Enter mechanic's last name: ", 32);
pub const MECHANIC_EXPERIENCE: IntegerField = IntegerField::at_least(
    "Experience",
    "Enter mechanic's years of experience: ",
    0,
);

pub const CAR_VIN: TextField = TextField::new("VIN", "Enter car's vin: ", 16);
pub const CAR_MAKE: TextField = TextField::new("Make", "Enter car's make: ", 32);
pub const CAR_MODEL: TextField = TextField::new("Model", "Enter car's model: ", 32);
pub const CAR_YEAR: IntegerField = IntegerField::at_least("Year", "Enter year of the car: ", 1970);
pub const CAR_OWNER: OptionalIntegerField = OptionalIntegerField::new(
    "Owner id",
    "Enter owner's customer id (leave blank to skip): ",
);

pub const REQUEST_ID: IntegerField =
    IntegerField::new("Request id", "Enter rid for service request: ");
pub const REQUEST_CUSTOMER_ID: IntegerField =
    IntegerField::new("Customer id", "Enter customer id for service request: ");
pub const REQUEST_CAR_VIN: TextField =
    TextField::new("VIN", "Enter car vin for service request: ", 16);
pub const REQUEST_DATE: DateField =
    DateField::new("Date", "Enter date of service request (YYYY-MM-DD): ");
pub const REQUEST_ODOMETER: IntegerField =
    IntegerField::at_least("Odometer reading", "Enter odometer reading: ", 1);
pub const REQUEST_COMPLAINT: FreeTextField = FreeTextField::new("Complaint", "Enter complaint: ");

pub const CLOSE_REQUEST_ID: IntegerField =
    IntegerField::new("Request id", "Enter a service request number: ");
pub const CLOSE_MECHANIC_ID: IntegerField =
    IntegerField::new("Mechanic id", "Enter mechanic id: ");
pub const CLOSE_COMMENT: FreeTextField =
    FreeTextField::new("Comment", "Enter comments about repair: ");
pub const CLOSE_BILL: IntegerField =
    IntegerField::at_least("Bill", "Enter bill amount to the customer: ", 0);
