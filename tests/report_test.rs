mod common;

use anyhow::Result;
use common::*;
use mechanic_shop::domain::model::Statement;
use mechanic_shop::domain::ports::DataStore;
use mechanic_shop::{QueryBuilder, Report, ReportEngine, SqliteStore};

fn empty_store() -> Result<SqliteStore> {
    Ok(SqliteStore::open_in_memory()?)
}

#[test]
fn test_total_bill_ranks_descending() -> Result<()> {
    let store = empty_store()?;
    let queries = QueryBuilder::new(&store);
    queries.add_mechanic(&mechanic(1))?;
    queries.add_car(&car("CAR", 2010))?;
    queries.add_customer(&customer(1, "Alice", "A"))?;
    queries.add_customer(&customer(2, "Bob", "B"))?;
    queries.add_customer(&customer(3, "Carol", "C"))?;

    // A: 100 + 200, B: 150, C: 300
    let bills = [(10, 1, 100), (11, 1, 200), (20, 2, 150), (30, 3, 300)];
    for (wid, (rid, customer_id, bill)) in bills.into_iter().enumerate() {
        queries.add_service_request(&request(rid, customer_id, "CAR", 5_000))?;
        seed_closed(&store, wid as i64 + 1, rid, 1, bill)?;
    }

    let rows = ReportEngine::new(&store).run(Report::TotalBill)?;
    let names = rows.column_values("fname");
    assert_eq!(names.len(), 3);
    assert_eq!(names[2], "Bob");
    assert!(names[..2].contains(&"Alice"));
    assert!(names[..2].contains(&"Carol"));
    assert_eq!(rows.column_values("total_bill"), vec!["300", "300", "150"]);
    Ok(())
}

#[test]
fn test_bill_filter_is_strict() -> Result<()> {
    let store = empty_store()?;
    let queries = QueryBuilder::new(&store);
    queries.add_mechanic(&mechanic(1))?;
    queries.add_car(&car("CAR", 2010))?;
    queries.add_customer(&customer(1, "Hundred", "H"))?;
    queries.add_customer(&customer(2, "NinetyNine", "N"))?;
    queries.add_service_request(&request(1, 1, "CAR", 10))?;
    queries.add_service_request(&request(2, 2, "CAR", 10))?;
    seed_closed(&store, 1, 1, 1, 100)?;
    seed_closed(&store, 2, 2, 1, 99)?;

    let rows = ReportEngine::new(&store).run(Report::BillUnder100)?;
    assert_eq!(rows.columns, vec!["fname", "lname", "bill"]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.value(0, "fname"), Some("NinetyNine"));
    assert_eq!(rows.value(0, "bill"), Some("99"));
    Ok(())
}

#[test]
fn test_more_than_20_cars() -> Result<()> {
    let store = empty_store()?;
    let queries = QueryBuilder::new(&store);
    queries.add_customer(&customer(1, "Fleet", "Owner"))?;
    queries.add_customer(&customer(2, "Twenty", "Exactly"))?;

    for n in 0..21 {
        let vin = format!("F{:03}", n);
        queries.add_car(&car(&vin, 2000))?;
        queries.add_ownership(1, &vin)?;
    }
    for n in 0..20 {
        let vin = format!("T{:03}", n);
        queries.add_car(&car(&vin, 2000))?;
        queries.add_ownership(2, &vin)?;
    }

    let rows = ReportEngine::new(&store).run(Report::MoreThan20Cars)?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.value(0, "fname"), Some("Fleet"));
    assert_eq!(rows.value(0, "num_cars"), Some("21"));
    Ok(())
}

#[test]
fn test_old_low_mileage_cars() -> Result<()> {
    let store = empty_store()?;
    let queries = QueryBuilder::new(&store);
    queries.add_customer(&customer(1, "Old", "Timer"))?;
    queries.add_car(&car("OLD-LOW", 1994))?;
    queries.add_car(&car("OLD-HIGH", 1980))?;
    queries.add_car(&car("NEW-LOW", 1995))?;
    queries.add_service_request(&request(1, 1, "OLD-LOW", 49_999))?;
    queries.add_service_request(&request(2, 1, "OLD-HIGH", 50_000))?;
    queries.add_service_request(&request(3, 1, "NEW-LOW", 100))?;

    let rows = ReportEngine::new(&store).run(Report::OldLowMileage)?;
    assert_eq!(rows.column_values("vin"), vec!["OLD-LOW"]);
    assert_eq!(rows.value(0, "odometer"), Some("49999"));
    Ok(())
}

#[test]
fn test_most_serviced_returns_all_tied_cars() -> Result<()> {
    let store = empty_store()?;
    let queries = QueryBuilder::new(&store);
    queries.add_customer(&customer(1, "Busy", "Driver"))?;
    for vin in ["AAA", "BBB", "CCC"] {
        queries.add_car(&car(vin, 2001))?;
    }
    let visits = [(1, "AAA"), (2, "AAA"), (3, "BBB"), (4, "BBB"), (5, "CCC")];
    for (rid, vin) in visits {
        queries.add_service_request(&request(rid, 1, vin, 10))?;
    }

    let rows = ReportEngine::new(&store).run(Report::MostServiced)?;
    assert_eq!(rows.column_values("vin"), vec!["AAA", "BBB"]);
    assert_eq!(rows.column_values("service_count"), vec!["2", "2"]);
    Ok(())
}

#[test]
fn test_reports_on_empty_store_are_empty() -> Result<()> {
    let store = empty_store()?;
    let engine = ReportEngine::new(&store);
    for report in Report::ALL {
        let rows = engine.run(report)?;
        assert!(rows.is_empty(), "{} returned rows", report);
        assert!(!rows.columns.is_empty());
    }
    Ok(())
}

#[test]
fn test_customer_round_trip_is_verbatim() -> Result<()> {
    let store = empty_store()?;
    let queries = QueryBuilder::new(&store);
    let stored = mechanic_shop::domain::model::Customer {
        id: 77,
        fname: " O'Neil ".to_string(),
        lname: "Smith; DROP TABLE Car".to_string(),
        phone: "+1 555 0100".to_string(),
        address: "12 \"Quoted\" Rd".to_string(),
    };
    queries.add_customer(&stored)?;

    let rows = store.query(&Statement::new(
        "SELECT id, fname, lname, phone, address FROM Customer",
    ))?;
    assert_eq!(
        rows.into_rows(),
        vec![vec![
            "77".to_string(),
            " O'Neil ".to_string(),
            "Smith; DROP TABLE Car".to_string(),
            "+1 555 0100".to_string(),
            "12 \"Quoted\" Rd".to_string(),
        ]]
    );
    assert_eq!(store.count(&Statement::new("SELECT vin FROM Car"))?, 0);
    Ok(())
}
