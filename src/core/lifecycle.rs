use crate::core::query_builder::{self, QueryBuilder};
use crate::domain::model::{ClosedRequest, ServiceRequest, WorkOrder};
use crate::domain::ports::DataStore;
use crate::utils::error::{ReferenceError, Result, ShopError};
use chrono::NaiveDate;

/// Sequence that numbers work orders.
pub const WORK_ORDER_SEQUENCE: &str = "Closed_Request";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Request exists and has no closing work order.
    Open,
    Closed { wid: i64 },
}

/// Open -> Closed transitions for service requests.
///
/// Every reference is checked with a lookup before anything is written, and a closed
/// request can not be closed again.
pub struct ServiceRequestLifecycle<'s, S: DataStore> {
    store: &'s S,
    queries: QueryBuilder<'s, S>,
}

impl<'s, S: DataStore> ServiceRequestLifecycle<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            queries: QueryBuilder::new(store),
        }
    }

    /// `None` when no service request with this id exists.
    pub fn state_of(&self, rid: i64) -> Result<Option<RequestState>> {
        if !self.queries.service_request_exists(rid)? {
            return Ok(None);
        }

        let closed = self.store.query(&query_builder::closed_request_for(rid))?;
        match closed.value(0, "wid") {
            None => Ok(Some(RequestState::Open)),
            Some(raw) => {
                let wid = raw.parse::<i64>().map_err(|_| ShopError::ProcessingError {
                    message: format!("work order id '{}' for request {} is not a number", raw, rid),
                })?;
                Ok(Some(RequestState::Closed { wid }))
            }
        }
    }

    pub fn require_open(&self, rid: i64) -> Result<()> {
        match self.state_of(rid)? {
            Some(RequestState::Open) => Ok(()),
            Some(RequestState::Closed { wid }) => {
                Err(ReferenceError::AlreadyClosed { rid, wid }.into())
            }
            None => Err(ReferenceError::not_found("Service request", rid).into()),
        }
    }

    pub fn require_unused_request_id(&self, rid: i64) -> Result<()> {
        if self.queries.service_request_exists(rid)? {
            return Err(ReferenceError::already_exists("Service request", rid).into());
        }
        Ok(())
    }

    pub fn require_customer(&self, customer_id: i64) -> Result<()> {
        if !self.queries.customer_exists(customer_id)? {
            return Err(ReferenceError::not_found("Customer", customer_id).into());
        }
        Ok(())
    }

    pub fn require_car(&self, vin: &str) -> Result<()> {
        if !self.queries.car_exists(vin)? {
            return Err(ReferenceError::not_found("Car", vin).into());
        }
        Ok(())
    }

    pub fn require_mechanic(&self, mid: i64) -> Result<()> {
        if !self.queries.mechanic_exists(mid)? {
            return Err(ReferenceError::not_found("Mechanic", mid).into());
        }
        Ok(())
    }

    /// Creates a request in the `Open` state.
    pub fn open(&self, request: &ServiceRequest) -> Result<()> {
        self.store.atomically(|_| {
            self.require_unused_request_id(request.rid)?;
            self.require_customer(request.customer_id)?;
            self.require_car(&request.car_vin)?;
            self.queries.add_service_request(request)
        })?;

        tracing::info!(
            rid = request.rid,
            customer_id = request.customer_id,
            vin = %request.car_vin,
            "service request opened"
        );
        Ok(())
    }

    /// Moves an `Open` request to `Closed` and returns the work order that closed it.
    ///
    /// The state check, insert and work-order id read run as one serialized unit, so two
    /// operators can neither share a work-order id nor close the same request twice.
    pub fn close(&self, order: &WorkOrder, date: NaiveDate) -> Result<ClosedRequest> {
        let wid = self.store.atomically(|store| {
            self.require_open(order.rid)?;
            self.require_mechanic(order.mid)?;
            self.queries.add_closed_request(order, date)?;
            store
                .current_sequence_value(WORK_ORDER_SEQUENCE)?
                .ok_or_else(|| ShopError::ProcessingError {
                    message: "work order sequence was not advanced".to_string(),
                })
        })?;

        tracing::info!(
            wid,
            rid = order.rid,
            mid = order.mid,
            bill = order.bill,
            "service request closed"
        );
        Ok(ClosedRequest {
            wid,
            rid: order.rid,
            mid: order.mid,
            date,
            comment: order.comment.clone(),
            bill: order.bill,
        })
    }
}
