use crate::core::lifecycle::ServiceRequestLifecycle;
use crate::core::query_builder::QueryBuilder;
use crate::core::reports::{Report, ReportEngine};
use crate::core::validator::{self, FieldCollector};
use crate::domain::model::{Car, ClosedRequest, Customer, Mechanic, ServiceRequest, WorkOrder};
use crate::domain::ports::{Console, DataStore};
use crate::utils::error::{ReferenceError, Result, ShopError};
use chrono::NaiveDate;
use std::fmt;

/// One entry of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AddCustomer,
    AddMechanic,
    AddCar,
    InsertServiceRequest,
    CloseServiceRequest,
    Report(Report),
    Exit,
}

impl Operation {
    pub const MENU: [Operation; 11] = [
        Operation::AddCustomer,
        Operation::AddMechanic,
        Operation::AddCar,
        Operation::InsertServiceRequest,
        Operation::CloseServiceRequest,
        Operation::Report(Report::BillUnder100),
        Operation::Report(Report::MoreThan20Cars),
        Operation::Report(Report::OldLowMileage),
        Operation::Report(Report::MostServiced),
        Operation::Report(Report::TotalBill),
        Operation::Exit,
    ];

    /// Maps a menu number (1-11) to its operation.
    pub fn from_choice(choice: i64) -> Option<Operation> {
        if !(1..=Self::MENU.len() as i64).contains(&choice) {
            return None;
        }
        Some(Self::MENU[(choice - 1) as usize])
    }

    pub fn number(self) -> usize {
        Self::MENU
            .iter()
            .position(|op| *op == self)
            .map(|idx| idx + 1)
            .unwrap_or(0)
    }

    pub fn label(self) -> &'static str {
        match self {
            Operation::AddCustomer => "Add customer",
            Operation::AddMechanic => "Add mechanic",
            Operation::AddCar => "Add car",
            Operation::InsertServiceRequest => "Insert service request",
            Operation::CloseServiceRequest => "Close service request",
            Operation::Report(report) => report.title(),
            Operation::Exit => "< EXIT",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Entry point for the menu operations. Owns the store connection and the operator console.
///
/// Each operation runs to completion before the next choice is read. A store failure
/// aborts only the operation it happened in.
pub struct Shop<S: DataStore, C: Console> {
    store: S,
    console: C,
    today: fn() -> NaiveDate,
}

impl<S: DataStore, C: Console> Shop<S, C> {
    pub fn new(store: S, console: C) -> Self {
        Self {
            store,
            console,
            today: local_today,
        }
    }

    /// Replaces the clock used to date closed requests.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn into_parts(self) -> (S, C) {
        (self.store, self.console)
    }

    /// Serves menu choices until EXIT is picked or input ends.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.show_menu()?;

            let operation = match self.read_choice() {
                Ok(op) => op,
                Err(ShopError::InputClosed) => {
                    tracing::info!("input closed, leaving menu");
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            if operation == Operation::Exit {
                return Ok(());
            }

            match self.dispatch(operation) {
                Ok(()) => {}
                Err(ShopError::InputClosed) => {
                    tracing::info!(operation = %operation, "input closed mid-operation");
                    return Ok(());
                }
                Err(e) => self.report_failure(operation, &e)?,
            }
        }
    }

    pub fn dispatch(&mut self, operation: Operation) -> Result<()> {
        tracing::debug!(operation = %operation, "dispatching");
        match operation {
            Operation::AddCustomer => self.add_customer().map(drop),
            Operation::AddMechanic => self.add_mechanic().map(drop),
            Operation::AddCar => self.add_car().map(drop),
            Operation::InsertServiceRequest => self.insert_service_request().map(drop),
            Operation::CloseServiceRequest => self.close_service_request().map(drop),
            Operation::Report(report) => self.show_report(report),
            Operation::Exit => Ok(()),
        }
    }

    fn show_menu(&mut self) -> Result<()> {
        self.console.say("MAIN MENU")?;
        self.console.say("---------")?;
        for op in Operation::MENU {
            self.console.say(&format!("{}. {}", op.number(), op.label()))?;
        }
        Ok(())
    }

    fn read_choice(&mut self) -> Result<Operation> {
        loop {
            let line = match self.console.read_line("Please make your choice: ")? {
                Some(line) => line,
                None => return Err(ShopError::InputClosed),
            };

            match line.trim().parse::<i64>().ok().and_then(Operation::from_choice) {
                Some(op) => return Ok(op),
                None => self.console.warn("Your input is invalid!")?,
            }
        }
    }

    fn report_failure(&mut self, operation: Operation, error: &ShopError) -> Result<()> {
        tracing::error!(
            operation = %operation,
            category = ?error.category(),
            severity = ?error.severity(),
            "❌ operation aborted: {}",
            error
        );
        self.console.warn(&format!(
            "{} failed: {}",
            operation,
            error.user_friendly_message()
        ))?;
        self.console.warn(error.recovery_suggestion())
    }

    pub fn add_customer(&mut self) -> Result<Customer> {
        let queries = QueryBuilder::new(&self.store);
        let mut fields = FieldCollector::new(&mut self.console);

        let id = fields.collect_with(&validator::CUSTOMER_ID, |id| {
            if queries.customer_exists(*id)? {
                return Err(ReferenceError::already_exists("Customer", id).into());
            }
            Ok(())
        })?;
        let customer = Customer {
            id,
            fname: fields.collect(&validator::CUSTOMER_FNAME)?,
            lname: fields.collect(&validator::CUSTOMER_LNAME)?,
            phone: fields.collect(&validator::CUSTOMER_PHONE)?,
            address: fields.collect(&validator::CUSTOMER_ADDRESS)?,
        };

        queries.add_customer(&customer)?;
        tracing::info!(id, "✅ customer added");
        self.console.say(&format!("Customer {} added", id))?;
        Ok(customer)
    }

    pub fn add_mechanic(&mut self) -> Result<Mechanic> {
        let queries = QueryBuilder::new(&self.store);
        let mut fields = FieldCollector::new(&mut self.console);

        let id = fields.collect_with(&validator::MECHANIC_ID, |id| {
            if queries.mechanic_exists(*id)? {
                return Err(ReferenceError::already_exists("Mechanic", id).into());
            }
            Ok(())
        })?;
        let mechanic = Mechanic {
            id,
            fname: fields.collect(&validator::MECHANIC_FNAME)?,
            lname: fields.collect(&validator::MECHANIC_LNAME)?,
            experience: fields.collect(&validator::MECHANIC_EXPERIENCE)?,
        };

        queries.add_mechanic(&mechanic)?;
        tracing::info!(id, "✅ mechanic added");
        self.console.say(&format!("Mechanic {} added", id))?;
        Ok(mechanic)
    }

    /// Adds a car and, when an owner id is given, the ownership record in the same unit.
    pub fn add_car(&mut self) -> Result<Car> {
        let queries = QueryBuilder::new(&self.store);
        let mut fields = FieldCollector::new(&mut self.console);

        let vin = fields.collect_with(&validator::CAR_VIN, |vin| {
            if queries.car_exists(vin)? {
                return Err(ReferenceError::already_exists("Car", vin).into());
            }
            Ok(())
        })?;
        let car = Car {
            vin,
            make: fields.collect(&validator::CAR_MAKE)?,
            model: fields.collect(&validator::CAR_MODEL)?,
            year: fields.collect(&validator::CAR_YEAR)?,
        };
        let owner = fields.collect_with(&validator::CAR_OWNER, |owner| match owner {
            Some(id) if !queries.customer_exists(*id)? => {
                Err(ReferenceError::not_found("Customer", id).into())
            }
            _ => Ok(()),
        })?;

        let ownership_id = self.store.atomically(|_| {
            queries.add_car(&car)?;
            match owner {
                Some(customer_id) => queries.add_ownership(customer_id, &car.vin),
                None => Ok(None),
            }
        })?;

        tracing::info!(vin = %car.vin, owner = ?owner, ownership_id = ?ownership_id, "✅ car added");
        self.console.say(&format!("Car {} added", car.vin))?;
        Ok(car)
    }

    pub fn insert_service_request(&mut self) -> Result<ServiceRequest> {
        let lifecycle = ServiceRequestLifecycle::new(&self.store);
        let mut fields = FieldCollector::new(&mut self.console);

        let rid = fields.collect_with(&validator::REQUEST_ID, |rid| {
            lifecycle.require_unused_request_id(*rid)
        })?;
        let customer_id = fields.collect_with(&validator::REQUEST_CUSTOMER_ID, |id| {
            lifecycle.require_customer(*id)
        })?;
        let car_vin = fields.collect_with(&validator::REQUEST_CAR_VIN, |vin| {
            lifecycle.require_car(vin)
        })?;
        let request = ServiceRequest {
            rid,
            customer_id,
            car_vin,
            date: fields.collect(&validator::REQUEST_DATE)?,
            odometer: fields.collect(&validator::REQUEST_ODOMETER)?,
            complaint: fields.collect(&validator::REQUEST_COMPLAINT)?,
        };

        lifecycle.open(&request)?;
        self.console
            .say(&format!("Service request {} opened", request.rid))?;
        Ok(request)
    }

    pub fn close_service_request(&mut self) -> Result<ClosedRequest> {
        let lifecycle = ServiceRequestLifecycle::new(&self.store);
        let mut fields = FieldCollector::new(&mut self.console);

        let rid = fields.collect_with(&validator::CLOSE_REQUEST_ID, |rid| {
            lifecycle.require_open(*rid)
        })?;
        let mid = fields.collect_with(&validator::CLOSE_MECHANIC_ID, |mid| {
            lifecycle.require_mechanic(*mid)
        })?;
        let order = WorkOrder {
            rid,
            mid,
            comment: fields.collect(&validator::CLOSE_COMMENT)?,
            bill: fields.collect(&validator::CLOSE_BILL)?,
        };

        let closed = lifecycle.close(&order, (self.today)())?;
        self.console.say(&format!(
            "Service request {} closed with work order {}",
            closed.rid, closed.wid
        ))?;
        Ok(closed)
    }

    pub fn show_report(&mut self, report: Report) -> Result<()> {
        let rows = ReportEngine::new(&self.store).run(report)?;
        self.console.say(&format!("Listing {}", report.title()))?;
        self.console.render(&rows)?;
        self.console.say(&format!("total row(s): {}", rows.len()))
    }
}
