use crate::domain::model::{ResultSet, Statement};
use crate::domain::ports::DataStore;
use crate::utils::error::Result;
use std::fmt;
use std::str::FromStr;

/// The five canned read-only reports. None of them takes input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Report {
    /// Closed requests billed under 100, with the customer they belong to.
    BillUnder100,
    /// Customers that own more than 20 cars.
    MoreThan20Cars,
    /// Cars built before 1995 with a service visit under 50000 miles.
    OldLowMileage,
    /// Car(s) with the highest number of service requests.
    MostServiced,
    /// Customers ranked by the sum of their closed bills, highest first.
    TotalBill,
}

const BILL_UNDER_100_SQL: &str = "\
SELECT C.fname, C.lname, CR.bill
FROM Customer C
JOIN Service_Request SR ON SR.customer_id = C.id
JOIN Closed_Request CR ON CR.rid = SR.rid
WHERE CR.bill < 100
ORDER BY CR.wid";

const MORE_THAN_20_CARS_SQL: &str = "\
SELECT C.fname, C.lname, COUNT(*) AS num_cars
FROM Owns O
JOIN Customer C ON C.id = O.customer_id
GROUP BY C.id, C.fname, C.lname
HAVING COUNT(*) > 20
ORDER BY num_cars DESC, C.id";

const OLD_LOW_MILEAGE_SQL: &str = "\
SELECT Car.vin, Car.make, Car.model, Car.year, SR.odometer
FROM Car
JOIN Service_Request SR ON SR.car_vin = Car.vin
WHERE Car.year < 1995 AND SR.odometer < 50000
ORDER BY Car.vin, SR.rid";

const MOST_SERVICED_SQL: &str = "\
WITH service_counts AS (
    SELECT car_vin, COUNT(rid) AS service_count
    FROM Service_Request
    GROUP BY car_vin
)
SELECT Car.vin, Car.make, Car.model, Car.year, SC.service_count
FROM Car
JOIN service_counts SC ON SC.car_vin = Car.vin
WHERE SC.service_count = (SELECT MAX(service_count) FROM service_counts)
ORDER BY Car.vin";

// 總金額相同時依客戶 id 排序，輸出才穩定
const TOTAL_BILL_SQL: &str = "\
SELECT C.id, C.fname, C.lname, C.phone, C.address, SUM(CR.bill) AS total_bill
FROM Customer C
JOIN Service_Request SR ON SR.customer_id = C.id
JOIN Closed_Request CR ON CR.rid = SR.rid
GROUP BY C.id, C.fname, C.lname, C.phone, C.address
ORDER BY total_bill DESC, C.id";

impl Report {
    pub const ALL: [Report; 5] = [
        Report::BillUnder100,
        Report::MoreThan20Cars,
        Report::OldLowMileage,
        Report::MostServiced,
        Report::TotalBill,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Report::BillUnder100 => "bill-under-100",
            Report::MoreThan20Cars => "more-than-20-cars",
            Report::OldLowMileage => "old-low-mileage",
            Report::MostServiced => "most-serviced",
            Report::TotalBill => "total-bill",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Report::BillUnder100 => "Customers with a bill less than 100",
            Report::MoreThan20Cars => "Customers with more than 20 cars",
            Report::OldLowMileage => "Cars before 1995 with under 50000 miles",
            Report::MostServiced => "Cars with the most services",
            Report::TotalBill => "Customers in descending order of their total bill",
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            Report::BillUnder100 => BILL_UNDER_100_SQL,
            Report::MoreThan20Cars => MORE_THAN_20_CARS_SQL,
            Report::OldLowMileage => OLD_LOW_MILEAGE_SQL,
            Report::MostServiced => MOST_SERVICED_SQL,
            Report::TotalBill => TOTAL_BILL_SQL,
        }
    }

    pub fn statement(self) -> Statement {
        Statement::new(self.sql())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Report {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Report::ALL
            .into_iter()
            .find(|r| r.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = Report::ALL.iter().map(|r| r.slug()).collect();
                format!("unknown report '{}'. Known reports: {}", s, known.join(", "))
            })
    }
}

pub struct ReportEngine<'s, S: DataStore> {
    store: &'s S,
}

impl<'s, S: DataStore> ReportEngine<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub fn run(&self, report: Report) -> Result<ResultSet> {
        let rows = self.store.query(&report.statement())?;
        tracing::debug!(report = %report, rows = rows.len(), "report executed");
        Ok(rows)
    }
}
