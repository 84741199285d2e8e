use crate::domain::model::{Car, Customer, Mechanic, ServiceRequest, Statement, WorkOrder};
use crate::domain::ports::DataStore;
use crate::utils::error::Result;
use chrono::NaiveDate;

pub fn insert_customer(customer: &Customer) -> Statement {
    Statement::new(
        "INSERT INTO Customer (id, fname, lname, phone, address) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(customer.id)
    .bind(customer.fname.as_str())
    .bind(customer.lname.as_str())
    .bind(customer.phone.as_str())
    .bind(customer.address.as_str())
}

pub fn insert_mechanic(mechanic: &Mechanic) -> Statement {
    Statement::new("INSERT INTO Mechanic (id, fname, lname, experience) VALUES (?1, ?2, ?3, ?4)")
        .bind(mechanic.id)
        .bind(mechanic.fname.as_str())
        .bind(mechanic.lname.as_str())
        .bind(mechanic.experience)
}

pub fn insert_car(car: &Car) -> Statement {
    Statement::new("INSERT INTO Car (vin, make, model, year) VALUES (?1, ?2, ?3, ?4)")
        .bind(car.vin.as_str())
        .bind(car.make.as_str())
        .bind(car.model.as_str())
        .bind(car.year)
}

/// `ownership_id` comes from the store's sequence.
pub fn insert_ownership(customer_id: i64, car_vin: &str) -> Statement {
    Statement::new("INSERT INTO Owns (customer_id, car_vin) VALUES (?1, ?2)")
        .bind(customer_id)
        .bind(car_vin)
}

pub fn insert_service_request(request: &ServiceRequest) -> Statement {
    Statement::new(
        "INSERT INTO Service_Request (rid, customer_id, car_vin, date, odometer, complain) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(request.rid)
    .bind(request.customer_id)
    .bind(request.car_vin.as_str())
    .bind(request.date)
    .bind(request.odometer)
    .bind(request.complaint.as_str())
}

/// `wid` comes from the store's sequence.
pub fn insert_closed_request(order: &WorkOrder, date: NaiveDate) -> Statement {
    Statement::new(
        "INSERT INTO Closed_Request (rid, mid, date, comment, bill) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(order.rid)
    .bind(order.mid)
    .bind(date)
    .bind(order.comment.as_str())
    .bind(order.bill)
}

pub fn customer_by_id(id: i64) -> Statement {
    Statement::new("SELECT id, fname, lname, phone, address FROM Customer WHERE id = ?1").bind(id)
}

pub fn mechanic_by_id(id: i64) -> Statement {
    Statement::new("SELECT id, fname, lname, experience FROM Mechanic WHERE id = ?1").bind(id)
}

pub fn car_by_vin(vin: &str) -> Statement {
    Statement::new("SELECT vin, make, model, year FROM Car WHERE vin = ?1").bind(vin)
}

pub fn service_request_by_id(rid: i64) -> Statement {
    Statement::new(
        "SELECT rid, customer_id, car_vin, date, odometer, complain FROM Service_Request WHERE rid = ?1",
    )
    .bind(rid)
}

pub fn closed_request_for(rid: i64) -> Statement {
    Statement::new("SELECT wid, rid, mid, date, comment, bill FROM Closed_Request WHERE rid = ?1")
        .bind(rid)
}

/// Projects validated records onto single insert statements and submits them.
/// Performs no validation of its own.
pub struct QueryBuilder<'s, S: DataStore> {
    store: &'s S,
}

impl<'s, S: DataStore> QueryBuilder<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    fn submit(&self, statement: Statement) -> Result<()> {
        let affected = self.store.execute(&statement)?;
        tracing::debug!(sql = %statement.sql, affected, "statement executed");
        Ok(())
    }

    pub fn add_customer(&self, customer: &Customer) -> Result<()> {
        self.submit(insert_customer(customer))
    }

    pub fn add_mechanic(&self, mechanic: &Mechanic) -> Result<()> {
        self.submit(insert_mechanic(mechanic))
    }

    pub fn add_car(&self, car: &Car) -> Result<()> {
        self.submit(insert_car(car))
    }

    /// Records that `customer_id` owns `car_vin` and returns the new ownership id.
    pub fn add_ownership(&self, customer_id: i64, car_vin: &str) -> Result<Option<i64>> {
        self.submit(insert_ownership(customer_id, car_vin))?;
        self.store.current_sequence_value("Owns")
    }

    pub fn add_service_request(&self, request: &ServiceRequest) -> Result<()> {
        self.submit(insert_service_request(request))
    }

    pub fn add_closed_request(&self, order: &WorkOrder, date: NaiveDate) -> Result<()> {
        self.submit(insert_closed_request(order, date))
    }

    pub fn customer_exists(&self, id: i64) -> Result<bool> {
        self.store.exists(&customer_by_id(id))
    }

    pub fn mechanic_exists(&self, id: i64) -> Result<bool> {
        self.store.exists(&mechanic_by_id(id))
    }

    pub fn car_exists(&self, vin: &str) -> Result<bool> {
        self.store.exists(&car_by_vin(vin))
    }

    pub fn service_request_exists(&self, rid: i64) -> Result<bool> {
        self.store.exists(&service_request_by_id(rid))
    }
}
