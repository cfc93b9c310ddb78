#![allow(dead_code)]

use orderpay::application::engine::LifecycleEngine;
use orderpay::infrastructure::in_memory::{InMemoryOrderStore, InMemoryPaymentStore};
use std::fs::File;
use std::io::{Error, Write};
use std::path::Path;
use tempfile::NamedTempFile;

pub const HEADER: &str =
    "command,ref,target,title,topic,pages,urgency,requirements,provider,status,delivery_url";

pub fn engine() -> LifecycleEngine {
    LifecycleEngine::new(
        Box::new(InMemoryOrderStore::new()),
        Box::new(InMemoryPaymentStore::new()),
    )
}

/// Writes a script with the standard header followed by `lines`.
pub fn script(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}

/// Generates a script that creates, pays and confirms `orders` orders.
pub fn generate_script(path: &Path, orders: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(HEADER.split(','))?;

    let urgencies = ["normal", "urgent", "express"];
    for i in 1..=orders {
        let order = format!("o{i}");
        let payment = format!("p{i}");
        let pages = (i % 40 + 1).to_string();
        let urgency = urgencies[i % urgencies.len()];
        wtr.write_record([
            "create_order", &order, "", "Essay", "Topic", &pages, urgency, "", "", "", "",
        ])?;
        wtr.write_record(["pay", &payment, &order, "", "", "", "", "", "mock", "", ""])?;
        wtr.write_record(["confirm", "", &payment, "", "", "", "", "", "", "", ""])?;
    }

    wtr.flush()?;
    Ok(())
}
