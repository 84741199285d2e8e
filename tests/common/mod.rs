#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use mechanic_shop::domain::model::{Car, Customer, Mechanic, OutputFormat, ServiceRequest, Statement};
use mechanic_shop::domain::ports::DataStore;
use mechanic_shop::{QueryBuilder, Shop, SqliteStore, TerminalConsole};
use std::io::Cursor;

pub type ScriptedShop = Shop<SqliteStore, TerminalConsole<Cursor<String>, Vec<u8>>>;

pub fn fixed_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

/// Shop whose operator types `lines`, one per prompt.
pub fn scripted_shop(store: SqliteStore, lines: &[&str]) -> ScriptedShop {
    let mut script = lines.join("\n");
    script.push('\n');
    let console = TerminalConsole::new(Cursor::new(script), Vec::new(), OutputFormat::Tsv);
    Shop::new(store, console).with_clock(fixed_day)
}

pub fn output_of(shop: &ScriptedShop) -> String {
    String::from_utf8_lossy(shop.console().writer()).into_owned()
}

pub fn customer(id: i64, fname: &str, lname: &str) -> Customer {
    Customer {
        id,
        fname: fname.to_string(),
        lname: lname.to_string(),
        phone: format!("555-{:04}", id),
        address: format!("{} Main St", id),
    }
}

pub fn car(vin: &str, year: i64) -> Car {
    Car {
        vin: vin.to_string(),
        make: "Ford".to_string(),
        model: "Taurus".to_string(),
        year,
    }
}

pub fn mechanic(id: i64) -> Mechanic {
    Mechanic {
        id,
        fname: "Sam".to_string(),
        lname: "Wrench".to_string(),
        experience: 10,
    }
}

pub fn request(rid: i64, customer_id: i64, car_vin: &str, odometer: i64) -> ServiceRequest {
    ServiceRequest {
        rid,
        customer_id,
        car_vin: car_vin.to_string(),
        date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        odometer,
        complaint: "noise".to_string(),
    }
}

/// Inserts a closed request with an explicit work-order id, bypassing the lifecycle.
pub fn seed_closed(store: &SqliteStore, wid: i64, rid: i64, mid: i64, bill: i64) -> Result<()> {
    store.execute(
        &Statement::new(
            "INSERT INTO Closed_Request (wid, rid, mid, date, comment, bill) \
             VALUES (?1, ?2, ?3, '2024-02-01', 'seeded', ?4)",
        )
        .bind(wid)
        .bind(rid)
        .bind(mid)
        .bind(bill),
    )?;
    Ok(())
}

pub fn closed_count(store: &SqliteStore) -> Result<usize> {
    Ok(store.count(&Statement::new("SELECT wid FROM Closed_Request"))?)
}

/// Adds customer 1, car VIN1, mechanic 7 and open request 100 to `store`.
pub fn seed_shop(store: &SqliteStore) -> Result<()> {
    let queries = QueryBuilder::new(store);
    queries.add_customer(&customer(1, "Ada", "Lovelace"))?;
    queries.add_car(&car("VIN1", 1990))?;
    queries.add_mechanic(&mechanic(7))?;
    queries.add_service_request(&request(100, 1, "VIN1", 42_000))?;
    Ok(())
}

/// In-memory store with one customer (1), one car (VIN1), one mechanic (7) and one open request (100).
pub fn seeded_store() -> Result<SqliteStore> {
    let store = SqliteStore::open_in_memory()?;
    seed_shop(&store)?;
    Ok(store)
}
