//! Demo dataset for development and manual testing.
//!
//! Populates a store with a day's worth of field-service activity: four
//! technicians, three clients, a small parts inventory, and five tasks in
//! various states, with sheets, notes, usage, and timesheets attached. All
//! mutations go through the store so the inventory ledger stays consistent.

use chrono::{DateTime, Days, Duration, Local, NaiveDate, TimeZone, Utc};

use crate::models::{
    ChecklistItem, NewClient, NewNote, NewProduct, NewProductUsage, NewServiceSheet, NewTask,
    NewTimesheet, NewUser, TaskPriority, TaskStatus,
};
use crate::storage::Storage;

/// A local wall-clock time on the given day, as a UTC instant.
fn local_at(day: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    let naive = day.and_hms_opt(hour, minute, 0).unwrap_or_default();
    match Local.from_local_datetime(&naive).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        None => Utc::now(),
    }
}

fn user(username: &str, name: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        password: "password".to_string(),
        name: name.to_string(),
        avatar: None,
        role: "technician".to_string(),
    }
}

fn item(id: i64, name: &str, completed: bool) -> ChecklistItem {
    ChecklistItem {
        id,
        name: name.to_string(),
        completed,
    }
}

/// Fill an empty store with the demo dataset.
pub fn seed(storage: &mut Storage) -> crate::Result<()> {
    let today = Local::now().date_naive();
    let tomorrow = today + Days::new(1);

    let john = storage.create_user(user("john.smith", "John Smith"));
    let thomas = storage.create_user(user("tech2", "Thomas Miller"));
    let robert = storage.create_user(user("tech3", "Robert King"));
    let amy = storage.create_user(user("tech4", "Amy Lee"));

    let abc = storage.create_client(NewClient {
        name: "ABC Corporation".to_string(),
        contact_name: Some("Michael Davis".to_string()),
        phone: Some("555-123-4567".to_string()),
        email: Some("contact@abccorp.example".to_string()),
        address: Some("123 Main St".to_string()),
    });
    let xyz = storage.create_client(NewClient {
        name: "XYZ Industries".to_string(),
        contact_name: Some("Jennifer Wilson".to_string()),
        phone: Some("555-987-6543".to_string()),
        email: Some("info@xyzind.example".to_string()),
        address: Some("456 Industrial Pkwy".to_string()),
    });
    let acme = storage.create_client(NewClient {
        name: "Acme Co.".to_string(),
        contact_name: Some("David Brown".to_string()),
        phone: Some("555-456-7890".to_string()),
        email: Some("office@acme.example".to_string()),
        address: Some("789 Oak St".to_string()),
    });

    // HVF-001 is seeded with the usage on task 1 already applied, leaving
    // it below its threshold for the low-stock view
    let hvac_filter = storage.create_product(NewProduct {
        name: "HVAC Filter".to_string(),
        sku: "HVF-001".to_string(),
        description: Some("High-efficiency particulate air filter".to_string()),
        unit_price: 24.99,
        stock_quantity: 4,
        low_stock_threshold: 5,
        category: Some("HVAC".to_string()),
    });
    storage.create_product(NewProduct {
        name: "Copper Pipe Fitting".to_string(),
        sku: "CPF-001".to_string(),
        description: Some("3/4 inch copper elbow fitting".to_string()),
        unit_price: 8.50,
        stock_quantity: 2,
        low_stock_threshold: 10,
        category: Some("Plumbing".to_string()),
    });
    storage.create_product(NewProduct {
        name: "Wire Connector Pack".to_string(),
        sku: "WRC-001".to_string(),
        description: Some("Assorted wire connectors, 50 count".to_string()),
        unit_price: 5.99,
        stock_quantity: 5,
        low_stock_threshold: 10,
        category: Some("Electrical".to_string()),
    });
    storage.create_product(NewProduct {
        name: "Smart Thermostat".to_string(),
        sku: "THR-001".to_string(),
        description: Some("Programmable WiFi thermostat".to_string()),
        unit_price: 89.99,
        stock_quantity: 15,
        low_stock_threshold: 3,
        category: Some("HVAC".to_string()),
    });

    // Task 1: HVAC maintenance underway at Acme
    let hvac = storage.create_task(NewTask {
        title: "HVAC Maintenance".to_string(),
        description: Some("Quarterly maintenance of rooftop HVAC unit".to_string()),
        location_name: "Acme Co. Office".to_string(),
        location_address: "789 Oak St".to_string(),
        scheduled_date: local_at(today, 13, 0),
        status: TaskStatus::InProgress,
        priority: TaskPriority::High,
        progress: 65,
        client_id: Some(acme.id),
    });
    storage.set_task_assignees(hvac.id, &[john.id, thomas.id]);
    storage.create_service_sheet(NewServiceSheet {
        task_id: hvac.id,
        service_type: "maintenance".to_string(),
        equipment_type: "HVAC System".to_string(),
        checklist: vec![
            item(1, "Inspect equipment", true),
            item(2, "Clean filters", true),
            item(3, "Test functionality", false),
            item(4, "Verify thermostat operation", false),
        ],
        technician_signature: None,
        customer_signature: None,
        customer_name: None,
        completion_date: None,
    })?;
    storage.record_usage(NewProductUsage {
        task_id: hvac.id,
        product_id: hvac_filter.id,
        quantity: 2,
    })?;
    storage.create_note(NewNote {
        task_id: hvac.id,
        user_id: john.id,
        content: "Heavy dust build-up in the return vents; filters replaced.".to_string(),
        note_type: Default::default(),
        voice_recording_url: None,
        duration: None,
    });
    storage.create_timesheet(NewTimesheet {
        task_id: hvac.id,
        user_id: john.id,
        start_time: Utc::now() - Duration::minutes(60),
        end_time: None,
        duration_minutes: None,
        notes: None,
    });

    // Task 2: electrical repair wrapped up this morning
    let electrical = storage.create_task(NewTask {
        title: "Electrical Repair".to_string(),
        description: Some("Replace faulty breaker in main panel".to_string()),
        location_name: "XYZ Industries Plant".to_string(),
        location_address: "456 Industrial Pkwy".to_string(),
        scheduled_date: local_at(today, 11, 30),
        status: TaskStatus::Completed,
        priority: TaskPriority::Medium,
        progress: 100,
        client_id: Some(xyz.id),
    });
    storage.set_task_assignees(electrical.id, &[john.id]);
    storage.create_service_sheet(NewServiceSheet {
        task_id: electrical.id,
        service_type: "repair".to_string(),
        equipment_type: "Electrical Panel".to_string(),
        checklist: vec![
            item(1, "Isolate power", true),
            item(2, "Replace breaker", true),
            item(3, "Verify load", true),
        ],
        technician_signature: None,
        customer_signature: None,
        customer_name: Some("Jennifer Wilson".to_string()),
        completion_date: Some(local_at(today, 13, 30)),
    })?;
    let repair_start = local_at(today, 11, 30);
    storage.create_timesheet(NewTimesheet {
        task_id: electrical.id,
        user_id: john.id,
        start_time: repair_start,
        end_time: Some(repair_start + Duration::minutes(120)),
        duration_minutes: None,
        notes: Some("Breaker replaced and load tested.".to_string()),
    });

    // Remaining work for today and tomorrow
    let security = storage.create_task(NewTask {
        title: "Security System Check".to_string(),
        description: None,
        location_name: "ABC Corporation HQ".to_string(),
        location_address: "123 Main St".to_string(),
        scheduled_date: local_at(today, 15, 30),
        status: TaskStatus::Scheduled,
        priority: TaskPriority::Low,
        progress: 0,
        client_id: Some(abc.id),
    });
    storage.set_task_assignees(security.id, &[robert.id]);

    let servicing = storage.create_task(NewTask {
        title: "Equipment Servicing".to_string(),
        description: None,
        location_name: "Acme Co. Warehouse".to_string(),
        location_address: "790 Oak St".to_string(),
        scheduled_date: local_at(today, 17, 0),
        status: TaskStatus::Scheduled,
        priority: TaskPriority::Medium,
        progress: 0,
        client_id: Some(acme.id),
    });
    storage.set_task_assignees(servicing.id, &[john.id, amy.id]);

    storage.create_task(NewTask {
        title: "Plumbing Installation".to_string(),
        description: Some("Install new fixtures in second-floor restroom".to_string()),
        location_name: "ABC Corporation HQ".to_string(),
        location_address: "123 Main St".to_string(),
        scheduled_date: local_at(tomorrow, 10, 0),
        status: TaskStatus::Scheduled,
        priority: TaskPriority::Medium,
        progress: 0,
        client_id: Some(abc.id),
    });

    Ok(())
}
