use crate::domain::order::{OrderStatus, Urgency};
use crate::domain::payment::{PaymentStatus, Provider};
use crate::domain::pricing::Amount;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// Final state of one order, keyed by its script name.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct OrderRow {
    pub order: String,
    pub title: String,
    pub pages: u32,
    pub urgency: Urgency,
    pub amount: Amount,
    pub currency: String,
    pub status: OrderStatus,
    pub delivery_url: Option<String>,
}

/// Final state of one payment, keyed by its script name.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct PaymentRow {
    pub payment: String,
    pub order: String,
    pub provider: Provider,
    pub amount: Amount,
    pub currency: String,
    pub status: PaymentStatus,
}

/// Writes lifecycle reports as CSV.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_orders(&mut self, rows: impl IntoIterator<Item = OrderRow>) -> Result<()> {
        self.write_rows(rows)
    }

    pub fn write_payments(&mut self, rows: impl IntoIterator<Item = PaymentRow>) -> Result<()> {
        self.write_rows(rows)
    }

    fn write_rows<T: Serialize>(&mut self, rows: impl IntoIterator<Item = T>) -> Result<()> {
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
