use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::geometry::CacheGeometry;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write CSV record: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush report: {0}")]
    Io(#[from] io::Error),
}

/// One decoded address, as written to the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessRecord {
    pub addr: u64,
    pub tag: u64,
    pub index: u64,
    pub offset: u64,
}

impl AccessRecord {
    pub fn new(geometry: &CacheGeometry, addr: u64) -> Self {
        let fields = geometry.fields(addr);
        AccessRecord {
            addr,
            tag: fields.tag,
            index: fields.index,
            offset: fields.offset,
        }
    }
}

/// Writes a header and one row per address. Returns the number of rows written.
pub fn write_fields<W, I>(
    geometry: &CacheGeometry,
    addrs: I,
    writer: W,
) -> Result<usize, ReportError>
where
    W: io::Write,
    I: IntoIterator<Item = u64>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    let mut rows = 0;
    for addr in addrs {
        wtr.serialize(AccessRecord::new(geometry, addr))?;
        rows += 1;
    }
    if rows == 0 {
        // serialize() only emits the header alongside the first record
        wtr.write_record(["addr", "tag", "index", "offset"])?;
    }
    wtr.flush()?;
    log::debug!("wrote {} decoded addresses", rows);
    Ok(rows)
}
