//! CSV export of saved quotes.
//!
//! ## CSV Format
//!
//! One row per quote, in list order (newest first). Money columns are
//! rounded to cents and labor hours to two places; the stored totals keep
//! full precision.
//!
//! | Column          | Notes                                   |
//! |-----------------|-----------------------------------------|
//! | `id`            | Opaque quote id                         |
//! | `status`        | `pending`, `sold` or `void`             |
//! | `created_at`    | RFC 3339, UTC                           |
//! | `updated_at`    | RFC 3339, UTC                           |
//! | `title`         |                                         |
//! | `customer_name` |                                         |
//! | `phone`         |                                         |
//! | `email`         |                                         |
//! | `address`       |                                         |
//! | `material`      | `wood`, `vinyl` or `chain`              |
//! | `height_ft`     |                                         |
//! | `total_lf`      |                                         |
//! | `labor_hours`   |                                         |
//! | `labor_cost`    |                                         |
//! | `material_cost` |                                         |
//! | `total`         |                                         |

use std::io::Write;
use std::path::Path;

use fence_core::Quote;
use fence_core::calculations::common::round_half_up;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    status: &'static str,
    created_at: String,
    updated_at: String,
    title: &'a str,
    customer_name: &'a str,
    phone: &'a str,
    email: &'a str,
    address: &'a str,
    material: &'static str,
    height_ft: Decimal,
    total_lf: Decimal,
    labor_hours: Decimal,
    labor_cost: Decimal,
    material_cost: Decimal,
    total: Decimal,
}

impl<'a> From<&'a Quote> for CsvRow<'a> {
    fn from(quote: &'a Quote) -> Self {
        Self {
            id: &quote.id,
            status: quote.status.as_str(),
            created_at: quote.created_at.to_rfc3339(),
            updated_at: quote.updated_at.to_rfc3339(),
            title: &quote.title,
            customer_name: &quote.customer.name,
            phone: &quote.customer.phone,
            email: &quote.customer.email,
            address: &quote.customer.address,
            material: quote.inputs.material.as_str(),
            height_ft: quote.inputs.height_ft.normalize(),
            total_lf: quote.totals.total_lf.normalize(),
            labor_hours: round_half_up(quote.totals.labor_hours),
            labor_cost: round_half_up(quote.totals.labor_cost),
            material_cost: round_half_up(quote.totals.material_cost),
            total: round_half_up(quote.totals.total),
        }
    }
}

/// Errors that can occur while exporting quotes.
#[derive(Debug, thiserror::Error)]
pub enum CsvExportError {
    #[error("cannot write '{}': {source}", path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

/// Write `quotes` as CSV with a header row. Returns the number of rows.
pub fn write_quotes<'a, W: Write>(
    writer: W,
    quotes: impl IntoIterator<Item = &'a Quote>,
) -> Result<usize, CsvExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    let mut count = 0;
    for quote in quotes {
        csv.serialize(CsvRow::from(quote))?;
        count += 1;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(count)
}

/// Convenience wrapper: create (or truncate) `path` and delegate to
/// [`write_quotes`].
pub fn export_to_file<'a>(
    path: &Path,
    quotes: impl IntoIterator<Item = &'a Quote>,
) -> Result<usize, CsvExportError> {
    let file = std::fs::File::create(path).map_err(|source| CsvExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_quotes(file, quotes)
}
